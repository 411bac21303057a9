//! Blog panes: a tree of entry links per blog and a content area showing one
//! entry at a time.
//!
//! Documents are fetched on worker threads and handed back over a channel
//! that the UI loop drains with [`BlogLoader::poll`]. The combined entries
//! document of each blog is cached after its first successful fetch; until
//! then every activation issues its own fetch, and whichever completes first
//! fills the cache.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::Duration;

use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};

use super::content::ContentSource;
use crate::error::FetchError;

/// One configured blog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlogConfig {
    pub id: String,
    /// Surface id of the window showing this blog.
    pub surface: String,
    pub title: String,
    pub tree_doc: String,
    pub entries_doc: String,
}

impl BlogConfig {
    pub fn new(
        id: impl Into<String>,
        surface: impl Into<String>,
        title: impl Into<String>,
        tree_doc: impl Into<String>,
        entries_doc: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            surface: surface.into(),
            title: title.into(),
            tree_doc: tree_doc.into(),
            entries_doc: entries_doc.into(),
        }
    }
}

/// A click target in a blog tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeItem {
    pub label: String,
    /// Content id of the entry; `None` for plain grouping rows.
    pub content_id: Option<String>,
    pub depth: usize,
}

/// What a content area currently shows.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PaneText {
    #[default]
    Empty,
    Loading,
    Ready(String),
    Failed(String),
}

impl PaneText {
    pub fn text(&self) -> &str {
        match self {
            PaneText::Empty => "",
            PaneText::Loading => "Loading...",
            PaneText::Ready(text) | PaneText::Failed(text) => text,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TreeState {
    #[default]
    NotLoaded,
    Loading,
    Ready(Vec<TreeItem>),
    Failed(String),
}

#[derive(Debug, Clone, Default)]
pub struct BlogPane {
    pub tree: TreeState,
    pub selected: usize,
    pub content: PaneText,
    pub wanted: Option<String>,
}

impl BlogPane {
    pub fn items(&self) -> &[TreeItem] {
        match &self.tree {
            TreeState::Ready(items) => items,
            _ => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum FetchKind {
    Tree(String),
    Entries(String),
    Document(String),
}

#[derive(Debug)]
struct Completion {
    kind: FetchKind,
    doc: String,
    result: Result<String, FetchError>,
}

pub fn load_error_text(doc: &str) -> String {
    format!("Error loading {doc}.")
}

pub struct BlogLoader {
    source: Arc<dyn ContentSource>,
    blogs: Vec<BlogConfig>,
    panes: BTreeMap<String, BlogPane>,
    documents: BTreeMap<String, PaneText>,
    cache: HashMap<String, Arc<String>>,
    tx: Sender<Completion>,
    rx: Receiver<Completion>,
    in_flight: usize,
}

impl std::fmt::Debug for BlogLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlogLoader")
            .field("blogs", &self.blogs)
            .field("in_flight", &self.in_flight)
            .finish_non_exhaustive()
    }
}

impl BlogLoader {
    pub fn new(source: Arc<dyn ContentSource>, blogs: Vec<BlogConfig>) -> Self {
        let (tx, rx) = mpsc::channel();
        let panes = blogs
            .iter()
            .map(|blog| (blog.id.clone(), BlogPane::default()))
            .collect();
        Self {
            source,
            blogs,
            panes,
            documents: BTreeMap::new(),
            cache: HashMap::new(),
            tx,
            rx,
            in_flight: 0,
        }
    }

    pub fn blogs(&self) -> &[BlogConfig] {
        &self.blogs
    }

    pub fn blog_for_surface(&self, surface: &str) -> Option<&BlogConfig> {
        self.blogs.iter().find(|blog| blog.surface == surface)
    }

    pub fn pane(&self, blog: &str) -> Option<&BlogPane> {
        self.panes.get(blog)
    }

    pub fn pane_mut(&mut self, blog: &str) -> Option<&mut BlogPane> {
        self.panes.get_mut(blog)
    }

    pub fn document(&self, name: &str) -> &PaneText {
        static EMPTY: PaneText = PaneText::Empty;
        self.documents.get(name).unwrap_or(&EMPTY)
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn is_cached(&self, blog: &str) -> bool {
        self.cache.contains_key(blog)
    }

    /// Start fetching every blog's tree document.
    pub fn load_trees(&mut self) {
        let jobs: Vec<(String, String)> = self
            .blogs
            .iter()
            .map(|blog| (blog.id.clone(), blog.tree_doc.clone()))
            .collect();
        for (id, doc) in jobs {
            if let Some(pane) = self.panes.get_mut(&id) {
                pane.tree = TreeState::Loading;
            }
            self.spawn_fetch(FetchKind::Tree(id), doc);
        }
    }

    /// Fetch an auxiliary document into its own pane.
    pub fn load_document(&mut self, name: &str) {
        self.documents.insert(name.to_string(), PaneText::Loading);
        self.spawn_fetch(FetchKind::Document(name.to_string()), name.to_string());
    }

    /// Show entry `content_id` of `blog`, fetching the entries document the
    /// first time.
    pub fn activate(&mut self, blog: &str, content_id: &str) {
        let Some(config) = self.blogs.iter().find(|b| b.id == blog) else {
            tracing::warn!(blog, "activate on unknown blog");
            return;
        };
        let entries_doc = config.entries_doc.clone();
        let cached = self.cache.get(blog).cloned();
        let Some(pane) = self.panes.get_mut(blog) else {
            return;
        };
        pane.wanted = Some(content_id.to_string());
        if let Some(doc) = cached {
            pane.content = render_fragment(&doc, content_id);
            return;
        }
        pane.content = PaneText::Loading;
        self.spawn_fetch(FetchKind::Entries(blog.to_string()), entries_doc);
    }

    /// Activate the tree item at `index` of `blog`, if it carries a content id.
    pub fn activate_index(&mut self, blog: &str, index: usize) -> bool {
        let Some(pane) = self.panes.get_mut(blog) else {
            return false;
        };
        let Some(content_id) = pane.items().get(index).and_then(|item| item.content_id.clone())
        else {
            return false;
        };
        pane.selected = index;
        self.activate(blog, &content_id);
        true
    }

    /// Apply every completed fetch. Returns true when any pane changed.
    pub fn poll(&mut self) -> bool {
        let mut changed = false;
        while let Ok(done) = self.rx.try_recv() {
            self.apply(done);
            changed = true;
        }
        changed
    }

    /// Wait up to `timeout` for one completion and apply it along with any
    /// others already queued.
    pub fn poll_timeout(&mut self, timeout: Duration) -> bool {
        match self.rx.recv_timeout(timeout) {
            Ok(done) => {
                self.apply(done);
                self.poll();
                true
            }
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => false,
        }
    }

    fn spawn_fetch(&mut self, kind: FetchKind, doc: String) {
        let source = Arc::clone(&self.source);
        let tx = self.tx.clone();
        let job_doc = doc.clone();
        let job_kind = kind.clone();
        let spawned = thread::Builder::new()
            .name(format!("fetch-{doc}"))
            .spawn(move || {
                let result = source.fetch(&job_doc);
                let _ = tx.send(Completion {
                    kind: job_kind,
                    doc: job_doc,
                    result,
                });
            });
        match spawned {
            Ok(_) => self.in_flight += 1,
            Err(err) => {
                tracing::error!(doc = %doc, error = %err, "failed to spawn fetch");
                self.in_flight += 1;
                self.apply(Completion {
                    kind,
                    doc,
                    result: Err(FetchError::Missing(err.to_string())),
                });
            }
        }
    }

    fn apply(&mut self, done: Completion) {
        self.in_flight = self.in_flight.saturating_sub(1);
        if let Err(err) = &done.result {
            tracing::warn!(doc = %done.doc, error = %err, "fetch failed");
        }
        match done.kind {
            FetchKind::Tree(blog) => {
                let Some(pane) = self.panes.get_mut(&blog) else {
                    return;
                };
                pane.tree = match done.result {
                    Ok(doc) => TreeState::Ready(parse_tree(&doc)),
                    Err(_) => TreeState::Failed(load_error_text(&done.doc)),
                };
            }
            FetchKind::Entries(blog) => {
                let doc = match done.result {
                    Ok(doc) => Arc::clone(self.cache.entry(blog.clone()).or_insert(Arc::new(doc))),
                    Err(_) => {
                        if let Some(pane) = self.panes.get_mut(&blog) {
                            pane.content = PaneText::Failed(load_error_text(&done.doc));
                        }
                        return;
                    }
                };
                if let Some(pane) = self.panes.get_mut(&blog)
                    && let Some(wanted) = pane.wanted.clone()
                {
                    pane.content = render_fragment(&doc, &wanted);
                }
            }
            FetchKind::Document(name) => {
                let text = match done.result {
                    Ok(doc) => PaneText::Ready(markdown_to_text(&doc)),
                    Err(_) => PaneText::Failed(load_error_text(&done.doc)),
                };
                self.documents.insert(name, text);
            }
        }
    }
}

fn render_fragment(doc: &str, content_id: &str) -> PaneText {
    match extract_fragment(doc, content_id) {
        Some(fragment) => PaneText::Ready(markdown_to_text(fragment)),
        None => {
            tracing::warn!(content_id, "entry not found in entries document");
            PaneText::Failed(format!("Entry {content_id} not found."))
        }
    }
}

fn options() -> Options {
    Options::ENABLE_HEADING_ATTRIBUTES
}

/// Collect the `#id` links of a tree document, with list nesting as depth.
/// List items without a link become grouping rows.
pub fn parse_tree(doc: &str) -> Vec<TreeItem> {
    let mut items = Vec::new();
    let mut depth = 0usize;
    let mut label: Option<String> = None;
    let mut target: Option<String> = None;
    let mut item_text = String::new();
    let mut in_item = false;
    for event in Parser::new_ext(doc, options()) {
        match event {
            Event::Start(Tag::List(_)) => {
                if in_item && !item_text.trim().is_empty() {
                    items.push(TreeItem {
                        label: item_text.trim().to_string(),
                        content_id: None,
                        depth: depth.saturating_sub(1),
                    });
                }
                item_text.clear();
                in_item = false;
                depth += 1;
            }
            Event::End(TagEnd::List(_)) => depth = depth.saturating_sub(1),
            Event::Start(Tag::Item) => {
                in_item = true;
                item_text.clear();
            }
            Event::End(TagEnd::Item) => {
                in_item = false;
                item_text.clear();
            }
            Event::Start(Tag::Link { dest_url, .. }) => {
                if let Some(id) = dest_url.strip_prefix('#') {
                    target = Some(id.to_string());
                    label = Some(String::new());
                }
            }
            Event::End(TagEnd::Link) => {
                if let (Some(id), Some(text)) = (target.take(), label.take()) {
                    items.push(TreeItem {
                        label: text.trim().to_string(),
                        content_id: Some(id),
                        depth: depth.saturating_sub(1),
                    });
                    in_item = false;
                    item_text.clear();
                }
            }
            Event::Text(text) | Event::Code(text) => {
                if let Some(label) = label.as_mut() {
                    label.push_str(&text);
                } else if in_item {
                    item_text.push_str(&text);
                }
            }
            _ => {}
        }
    }
    items
}

/// Source slice of the section whose heading carries `id`, up to the next
/// heading of the same or a higher level.
pub fn extract_fragment<'a>(doc: &'a str, id: &str) -> Option<&'a str> {
    let mut start: Option<(usize, usize)> = None;
    for (event, range) in Parser::new_ext(doc, options()).into_offset_iter() {
        let Event::Start(Tag::Heading {
            level, id: heading, ..
        }) = event
        else {
            continue;
        };
        let level = level as usize;
        match start {
            None if heading.as_deref() == Some(id) => start = Some((range.start, level)),
            Some((from, found)) if level <= found => {
                return Some(doc[from..range.start].trim_end());
            }
            _ => {}
        }
    }
    start.map(|(from, _)| doc[from..].trim_end())
}

/// Flatten Markdown into display text: one line per block, blank lines
/// between paragraphs, bullets for list items.
pub fn markdown_to_text(doc: &str) -> String {
    let mut out = String::new();
    let mut list_depth = 0usize;
    for event in Parser::new_ext(doc, options()) {
        match event {
            Event::Text(text) | Event::Code(text) => out.push_str(&text),
            Event::SoftBreak => out.push(' '),
            Event::HardBreak => out.push('\n'),
            Event::Start(Tag::List(_)) => {
                if !out.is_empty() && !out.ends_with('\n') {
                    out.push('\n');
                }
                list_depth += 1;
            }
            Event::End(TagEnd::List(_)) => {
                list_depth = list_depth.saturating_sub(1);
                if list_depth == 0 {
                    out.push('\n');
                }
            }
            Event::Start(Tag::Item) => {
                out.push_str(&"  ".repeat(list_depth.saturating_sub(1)));
                out.push_str("• ");
            }
            Event::End(TagEnd::Item) => {
                if !out.ends_with('\n') {
                    out.push('\n');
                }
            }
            Event::End(TagEnd::Heading(_) | TagEnd::Paragraph) => {
                if list_depth == 0 {
                    out.push_str("\n\n");
                }
            }
            _ => {}
        }
    }
    out.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use std::sync::Mutex;

    const ENTRIES: &str = indoc! {"
        # First {#entry1}

        Hello *there*.

        ## Detail {#entry1-detail}

        More.

        # Second {#entry2}

        Bye.
    "};

    #[derive(Default)]
    struct MapSource {
        docs: BTreeMap<String, String>,
        calls: Mutex<Vec<String>>,
    }

    impl MapSource {
        fn with(mut self, name: &str, body: &str) -> Self {
            self.docs.insert(name.to_string(), body.to_string());
            self
        }
    }

    impl ContentSource for MapSource {
        fn fetch(&self, name: &str) -> Result<String, FetchError> {
            if let Ok(mut calls) = self.calls.lock() {
                calls.push(name.to_string());
            }
            self.docs
                .get(name)
                .cloned()
                .ok_or_else(|| FetchError::Missing(name.to_string()))
        }
    }

    fn settle(loader: &mut BlogLoader) {
        while loader.in_flight() > 0 {
            assert!(loader.poll_timeout(Duration::from_secs(5)), "fetch timed out");
        }
    }

    #[test]
    fn tree_collects_links_with_depth() {
        let doc = indoc! {"
            - 2024
              - [One](#e1)
              - [Two](#e2)
            - [Top](#e3)
            - [External](https://example.com)
        "};
        let items = parse_tree(doc);
        let summary: Vec<(&str, Option<&str>, usize)> = items
            .iter()
            .map(|i| (i.label.as_str(), i.content_id.as_deref(), i.depth))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("2024", None, 0),
                ("One", Some("e1"), 1),
                ("Two", Some("e2"), 1),
                ("Top", Some("e3"), 0),
            ]
        );
    }

    #[test]
    fn fragment_spans_to_next_sibling_heading() {
        let first = extract_fragment(ENTRIES, "entry1").unwrap();
        assert!(first.starts_with("# First"));
        assert!(first.contains("More."));
        assert!(!first.contains("Second"));
        assert_eq!(
            extract_fragment(ENTRIES, "entry1-detail").unwrap(),
            "## Detail {#entry1-detail}\n\nMore."
        );
        assert!(extract_fragment(ENTRIES, "entry2").unwrap().ends_with("Bye."));
        assert_eq!(extract_fragment(ENTRIES, "missing"), None);
    }

    #[test]
    fn markdown_flattens_to_text() {
        let text = markdown_to_text("# Title {#t}\n\nSome *emphasis*\nwrapped.\n\n- a\n- b\n");
        assert_eq!(text, "Title\n\nSome emphasis wrapped.\n\n• a\n• b");
    }

    #[test]
    fn activation_fetches_once_then_uses_cache() {
        let source = Arc::new(
            MapSource::default()
                .with("Tree.md", "- [First](#entry1)\n- [Second](#entry2)\n")
                .with("Entries.md", ENTRIES),
        );
        let blog = BlogConfig::new("Blog1", "blog1", "Blog", "Tree.md", "Entries.md");
        let mut loader = BlogLoader::new(source.clone(), vec![blog]);
        loader.load_trees();
        settle(&mut loader);
        assert_eq!(loader.pane("Blog1").unwrap().items().len(), 2);

        assert!(loader.activate_index("Blog1", 0));
        assert_eq!(loader.pane("Blog1").unwrap().content, PaneText::Loading);
        settle(&mut loader);
        assert!(loader.is_cached("Blog1"));
        assert!(loader.pane("Blog1").unwrap().content.text().contains("Hello there."));

        loader.activate("Blog1", "entry2");
        assert_eq!(loader.in_flight(), 0);
        assert_eq!(loader.pane("Blog1").unwrap().content.text(), "Second\n\nBye.");
        let calls = source.calls.lock().unwrap().clone();
        assert_eq!(calls.iter().filter(|c| *c == "Entries.md").count(), 1);
    }

    #[test]
    fn failed_entries_fetch_renders_error_text() {
        let source = Arc::new(MapSource::default());
        let blog = BlogConfig::new(
            "Blog1",
            "blog1",
            "Random Thoughts",
            "Random_Thought_Tree.html",
            "Random_Thought_Entries.html",
        );
        let mut loader = BlogLoader::new(source, vec![blog]);
        loader.activate("Blog1", "entry42");
        settle(&mut loader);
        assert_eq!(
            loader.pane("Blog1").unwrap().content,
            PaneText::Failed("Error loading Random_Thought_Entries.html.".to_string())
        );
        assert!(!loader.is_cached("Blog1"));
    }

    #[test]
    fn failed_tree_fetch_renders_error_text() {
        let source = Arc::new(MapSource::default());
        let blog = BlogConfig::new("Blog1", "blog1", "Blog", "Tree.md", "Entries.md");
        let mut loader = BlogLoader::new(source, vec![blog]);
        loader.load_trees();
        settle(&mut loader);
        assert_eq!(
            loader.pane("Blog1").unwrap().tree,
            TreeState::Failed("Error loading Tree.md.".to_string())
        );
    }

    #[test]
    fn missing_fragment_is_reported() {
        let source = Arc::new(MapSource::default().with("Entries.md", ENTRIES));
        let blog = BlogConfig::new("Blog1", "blog1", "Blog", "Tree.md", "Entries.md");
        let mut loader = BlogLoader::new(source, vec![blog]);
        loader.activate("Blog1", "nope");
        settle(&mut loader);
        assert_eq!(
            loader.pane("Blog1").unwrap().content.text(),
            "Entry nope not found."
        );
    }

    #[test]
    fn documents_load_into_their_own_pane() {
        let source = Arc::new(MapSource::default().with("New.md", "- one\n- two\n"));
        let mut loader = BlogLoader::new(source, Vec::new());
        loader.load_document("New.md");
        loader.load_document("Gone.md");
        assert_eq!(loader.document("New.md"), &PaneText::Loading);
        settle(&mut loader);
        assert_eq!(loader.document("New.md").text(), "• one\n• two");
        assert_eq!(loader.document("Gone.md").text(), "Error loading Gone.md.");
        assert_eq!(loader.document("Other.md"), &PaneText::Empty);
    }
}
