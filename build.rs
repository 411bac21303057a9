use indoc::indoc;
use std::env;
use std::fs;
use std::path::Path;

const CONTENT_REL: &str = "assets/content";

fn main() {
    let manifest = env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR not set");
    let content_dir = Path::new(&manifest).join(CONTENT_REL);
    // Re-run build if any demo document changes
    println!("cargo:rerun-if-changed={}", content_dir.display());

    let out_dir = env::var("OUT_DIR").expect("OUT_DIR not set");
    let dest_dir = Path::new(&out_dir).join("content");
    fs::create_dir_all(&dest_dir).expect("failed to create content dir in OUT_DIR");

    let mut names: Vec<String> = fs::read_dir(&content_dir)
        .map(|entries| {
            entries
                .filter_map(Result::ok)
                .filter(|entry| entry.path().is_file())
                .filter_map(|entry| entry.file_name().to_str().map(str::to_owned))
                .collect()
        })
        .unwrap_or_default();
    names.sort();

    // Copy each document into OUT_DIR so the generated table can
    // `include_str!` it without reaching back into the source tree.
    let mut rows = String::new();
    for name in &names {
        let src = content_dir.join(name);
        println!("cargo:rerun-if-changed={}", src.display());
        fs::copy(&src, dest_dir.join(name)).expect("failed to copy demo document to OUT_DIR");
        rows.push_str(&format!(
            "    ({name:?}, include_str!(concat!(env!(\"OUT_DIR\"), \"/content/{name}\"))),\n"
        ));
    }

    let gen_src = format!(
        indoc!(
            r#"
                /// Demo documents compiled into the binary, keyed by file name.
                pub const EMBEDDED_CONTENT: &[(&str, &str)] = &[
                {rows}];
            "#
        ),
        rows = rows,
    );
    let gen_path = Path::new(&out_dir).join("embedded_content.rs");
    fs::write(&gen_path, gen_src).expect("failed to write embedded_content.rs to OUT_DIR");
}
