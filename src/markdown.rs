// SPDX-License-Identifier: GPL-3.0-or-later
// vaultside - Markdown rendering for the sidebar preview

use crate::hotkeys::{display_symbol, match_buffer, BufferMatch, HotkeyAllocator};
use crate::tabs::is_url_open;
use pulldown_cmark::escape::{escape_href, escape_html};
use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag};
use regex::Regex;

/// Per-render options. The buffer and open-tab set only affect badge
/// styling; symbol assignment depends on the start index, the alphabet
/// flags and the region alone.
pub struct RenderOptions<'a> {
    pub hotkeys: bool,
    pub start_index: usize,
    pub letters_only: bool,
    pub buffer: &'a str,
    pub open_tabs: &'a [String],
    pub secondary_region: bool,
}

impl Default for RenderOptions<'_> {
    fn default() -> Self {
        Self {
            hotkeys: false,
            start_index: 0,
            letters_only: false,
            buffer: "",
            open_tabs: &[],
            secondary_region: false,
        }
    }
}

/// Render markdown content to an HTML fragment for the sidebar.
///
/// Wiki-links, external links and task checkboxes become elements carrying
/// the data attributes the host dispatches on (`data-page`, `data-url`,
/// `data-checked`/`data-text`), and with hotkeys enabled each target also
/// gets a `data-hotkey` attribute and a visible symbol badge. Symbols are
/// assigned in document order starting at `start_index`.
pub fn render_markdown(content: &str, opts: &RenderOptions) -> String {
    let mut walker = Annotator::new(opts);
    walker.run(content);
    walker.out
}

/// Count hotkey targets (wiki-links + external links + checkboxes) without
/// assigning symbols. The host uses this to offset a second region's start
/// index so the two symbol ranges stay disjoint.
pub fn count_targets(content: &str) -> usize {
    let opts = RenderOptions::default();
    let mut walker = Annotator::new(&opts);
    walker.run(content);
    walker.targets
}

struct TaskState {
    checked: bool,
    symbol: Option<String>,
    /// Literal task text, for data-text and the pomodoro control.
    text: String,
    /// Rendered inline content of the item.
    html: String,
}

struct LinkState {
    symbol: Option<String>,
    open_tab: bool,
}

struct Annotator<'a> {
    opts: &'a RenderOptions<'a>,
    alloc: Option<HotkeyAllocator>,
    out: String,
    /// Consecutive text events accumulate here so wiki-link syntax split
    /// across failed link-opener events is seen whole.
    text_buf: String,
    task: Option<TaskState>,
    link: Option<LinkState>,
    image: Option<(String, String)>,
    in_code_block: bool,
    item_depth: usize,
    targets: usize,
    wiki_re: Option<Regex>,
}

impl<'a> Annotator<'a> {
    fn new(opts: &'a RenderOptions<'a>) -> Self {
        let alloc = opts.hotkeys.then(|| {
            HotkeyAllocator::new(opts.start_index, opts.letters_only, opts.secondary_region)
        });
        Self {
            opts,
            alloc,
            out: String::new(),
            text_buf: String::new(),
            task: None,
            link: None,
            image: None,
            in_code_block: false,
            item_depth: 0,
            targets: 0,
            // Wiki-link syntax is not CommonMark, so it is matched in text
            // runs instead of the event stream.
            wiki_re: Regex::new(r"\[\[([^\]]+)\]\]").ok(),
        }
    }

    fn run(&mut self, content: &str) {
        let mut parse_opts = Options::empty();
        parse_opts.insert(Options::ENABLE_TASKLISTS);
        parse_opts.insert(Options::ENABLE_STRIKETHROUGH);
        let parser = Parser::new_ext(content, parse_opts);

        for event in parser {
            self.handle(event);
        }
        self.flush_text();
    }

    fn handle(&mut self, event: Event) {
        // While collecting an image's alt text only text matters.
        if self.image.is_some() {
            match event {
                Event::Text(t) | Event::Code(t) => {
                    if let Some((_, alt)) = &mut self.image {
                        alt.push_str(&t);
                    }
                }
                Event::End(Tag::Image(..)) => self.end_image(),
                _ => {}
            }
            return;
        }

        match event {
            Event::Start(tag) => self.start_tag(tag),
            Event::End(tag) => self.end_tag(tag),
            Event::Text(text) => {
                if self.in_code_block {
                    let _ = escape_html(&mut self.out, &text);
                } else {
                    self.text_buf.push_str(&text);
                }
            }
            Event::Code(code) => {
                self.flush_text();
                if let Some(task) = &mut self.task {
                    task.text.push_str(&code);
                }
                self.push_raw("<code>");
                self.push_text(&code);
                self.push_raw("</code>");
            }
            Event::Html(html) => {
                self.flush_text();
                self.push_raw(&html);
            }
            Event::SoftBreak => {
                // The sidebar treats single newlines as hard breaks, like
                // the GFM `breaks` rendering mode.
                self.flush_text();
                self.push_raw("<br>\n");
            }
            Event::HardBreak => {
                self.flush_text();
                self.push_raw("<br>\n");
            }
            Event::Rule => {
                self.flush_text();
                self.out.push_str("<hr />\n");
            }
            Event::TaskListMarker(checked) => {
                self.flush_text();
                self.targets += 1;
                let symbol = self.alloc.as_mut().map(|a| a.next_symbol());
                self.task = Some(TaskState {
                    checked,
                    symbol,
                    text: String::new(),
                    html: String::new(),
                });
            }
            Event::FootnoteReference(_) => {}
        }
    }

    fn start_tag(&mut self, tag: Tag) {
        match tag {
            Tag::Paragraph => {
                self.flush_text();
                // Task items render as a single inline span, and list items
                // stay tight, so paragraphs inside items are elided.
                if self.item_depth == 0 {
                    self.out.push_str("<p>");
                }
            }
            Tag::Heading(level, _, _) => {
                self.flush_text();
                self.out.push_str(&format!("<{}>", level));
            }
            Tag::BlockQuote => {
                self.flush_text();
                self.out.push_str("<blockquote>\n");
            }
            Tag::CodeBlock(kind) => {
                self.flush_text();
                self.in_code_block = true;
                match kind {
                    CodeBlockKind::Fenced(lang) if !lang.is_empty() => {
                        self.out.push_str("<pre><code class=\"language-");
                        let _ = escape_html(&mut self.out, &lang);
                        self.out.push_str("\">");
                    }
                    _ => self.out.push_str("<pre><code>"),
                }
            }
            Tag::List(Some(1)) => {
                self.flush_text();
                self.out.push_str("<ol>\n");
            }
            Tag::List(Some(start)) => {
                self.flush_text();
                self.out.push_str(&format!("<ol start=\"{}\">\n", start));
            }
            Tag::List(None) => {
                self.flush_text();
                self.out.push_str("<ul>\n");
            }
            Tag::Item => {
                self.flush_text();
                self.item_depth += 1;
                self.out.push_str("<li>");
            }
            Tag::Emphasis => {
                self.flush_text();
                self.push_raw("<em>");
            }
            Tag::Strong => {
                self.flush_text();
                self.push_raw("<strong>");
            }
            Tag::Strikethrough => {
                self.flush_text();
                self.push_raw("<del>");
            }
            Tag::Link(_, dest, _) => {
                self.flush_text();
                self.start_external_link(&dest);
            }
            Tag::Image(_, dest, _) => {
                self.flush_text();
                self.image = Some((dest.to_string(), String::new()));
            }
            _ => {}
        }
    }

    fn end_tag(&mut self, tag: Tag) {
        match tag {
            Tag::Paragraph => {
                self.flush_text();
                if self.item_depth == 0 {
                    self.out.push_str("</p>\n");
                }
            }
            Tag::Heading(level, _, _) => {
                self.flush_text();
                self.out.push_str(&format!("</{}>\n", level));
            }
            Tag::BlockQuote => {
                self.flush_text();
                self.out.push_str("</blockquote>\n");
            }
            Tag::CodeBlock(_) => {
                self.in_code_block = false;
                self.out.push_str("</code></pre>\n");
            }
            Tag::List(Some(_)) => {
                self.flush_text();
                self.out.push_str("</ol>\n");
            }
            Tag::List(None) => {
                self.flush_text();
                self.out.push_str("</ul>\n");
            }
            Tag::Item => {
                self.flush_text();
                if let Some(task) = self.task.take() {
                    self.emit_checkbox(task);
                }
                self.item_depth = self.item_depth.saturating_sub(1);
                self.out.push_str("</li>\n");
            }
            Tag::Emphasis => {
                self.flush_text();
                self.push_raw("</em>");
            }
            Tag::Strong => {
                self.flush_text();
                self.push_raw("</strong>");
            }
            Tag::Strikethrough => {
                self.flush_text();
                self.push_raw("</del>");
            }
            Tag::Link(..) => {
                self.flush_text();
                self.end_external_link();
            }
            Tag::Image(..) => self.end_image(),
            _ => {}
        }
    }

    /// Flush buffered text: wiki-link matches become annotated anchors,
    /// everything between them is escaped verbatim.
    fn flush_text(&mut self) {
        if self.text_buf.is_empty() {
            return;
        }
        let buf = std::mem::take(&mut self.text_buf);
        if let Some(task) = &mut self.task {
            task.text.push_str(&buf);
        }

        let matches: Vec<(usize, usize, String)> = match &self.wiki_re {
            Some(re) => re
                .captures_iter(&buf)
                .filter_map(|cap| {
                    let whole = cap.get(0)?;
                    let page = cap.get(1)?.as_str().to_string();
                    Some((whole.start(), whole.end(), page))
                })
                .collect(),
            None => Vec::new(),
        };

        let mut last = 0;
        for (start, end, page) in matches {
            self.push_text(&buf[last..start]);
            self.emit_wiki_link(&page);
            last = end;
        }
        self.push_text(&buf[last..]);
    }

    fn emit_wiki_link(&mut self, page: &str) {
        self.targets += 1;
        let symbol = self.alloc.as_mut().map(|a| a.next_symbol());
        self.push_raw("<a href=\"#\" class=\"wiki-link\" data-page=\"");
        self.push_text(page);
        self.push_raw("\"");
        if let Some(sym) = &symbol {
            self.push_raw(&format!(" data-hotkey=\"{}\"", sym));
        }
        self.push_raw(">");
        self.push_text(page);
        if let Some(sym) = &symbol {
            let badge = badge_html(sym, self.opts.buffer, false);
            self.push_raw(" ");
            self.push_raw(&badge);
        }
        self.push_raw("</a>");
    }

    fn start_external_link(&mut self, dest: &str) {
        self.targets += 1;
        let symbol = self.alloc.as_mut().map(|a| a.next_symbol());
        let open_tab = is_url_open(dest, self.opts.open_tabs);
        self.push_raw("<a href=\"");
        self.push_href(dest);
        self.push_raw("\" class=\"external-link\" data-url=\"");
        self.push_href(dest);
        self.push_raw("\"");
        if let Some(sym) = &symbol {
            self.push_raw(&format!(" data-hotkey=\"{}\"", sym));
        }
        self.push_raw(">");
        self.link = Some(LinkState { symbol, open_tab });
    }

    fn end_external_link(&mut self) {
        if let Some(link) = self.link.take() {
            if let Some(sym) = &link.symbol {
                let badge = badge_html(sym, self.opts.buffer, link.open_tab);
                self.push_raw(" ");
                self.push_raw(&badge);
            }
        }
        self.push_raw("</a>");
    }

    fn end_image(&mut self) {
        if let Some((dest, alt)) = self.image.take() {
            self.push_raw("<img src=\"");
            self.push_href(&dest);
            self.push_raw("\" alt=\"");
            self.push_text(&alt);
            self.push_raw("\" />");
        }
    }

    fn emit_checkbox(&mut self, task: TaskState) {
        let state = if task.checked { "checked" } else { "unchecked" };
        let mark = if task.checked { "☑" } else { "☐" };
        let text = task.text.trim().to_string();

        self.out.push_str("<span class=\"task-checkbox ");
        self.out.push_str(state);
        self.out.push_str("\" data-checked=\"");
        self.out.push_str(if task.checked { "true" } else { "false" });
        self.out.push_str("\" data-text=\"");
        let _ = escape_html(&mut self.out, &text);
        self.out.push('"');
        if let Some(sym) = &task.symbol {
            self.out.push_str(&format!(" data-hotkey=\"{}\"", sym));
        }
        self.out.push('>');
        self.out.push_str(mark);
        self.out.push(' ');
        self.out.push_str(task.html.trim_end());
        if let Some(sym) = &task.symbol {
            let badge = badge_html(sym, self.opts.buffer, false);
            self.out.push(' ');
            self.out.push_str(&badge);
        }
        self.out.push_str("</span>");

        // Unfinished tasks get the timer control the pomodoro panel
        // dispatches on.
        if !task.checked {
            self.out
                .push_str("<button class=\"pomodoro-play\" data-task-text=\"");
            let _ = escape_html(&mut self.out, &text);
            self.out.push_str("\">▶</button>");
        }
    }

    /// Inline output goes into the open task item when one is being
    /// collected, otherwise straight to the fragment.
    fn push_raw(&mut self, s: &str) {
        match &mut self.task {
            Some(task) => task.html.push_str(s),
            None => self.out.push_str(s),
        }
    }

    fn push_text(&mut self, s: &str) {
        match &mut self.task {
            Some(task) => {
                let _ = escape_html(&mut task.html, s);
            }
            None => {
                let _ = escape_html(&mut self.out, s);
            }
        }
    }

    fn push_href(&mut self, s: &str) {
        match &mut self.task {
            Some(task) => {
                let _ = escape_href(&mut task.html, s);
            }
            None => {
                let _ = escape_href(&mut self.out, s);
            }
        }
    }
}

/// Badge for an assigned symbol. A full buffer match highlights the whole
/// badge; a first-character match on a multi-character symbol highlights
/// only the leading character; a link already open in a tab is flagged
/// independently of the buffer.
fn badge_html(symbol: &str, buffer: &str, open_tab: bool) -> String {
    let display = display_symbol(symbol);
    let open_class = if open_tab { " hotkey-open-tab" } else { "" };
    match match_buffer(symbol, buffer) {
        BufferMatch::Full => format!(
            "<span class=\"hotkey-symbol hotkey-highlighted{}\">{}</span>",
            open_class, display
        ),
        BufferMatch::Prefix => {
            let first: String = display.chars().take(1).collect();
            let rest: String = display.chars().skip(1).collect();
            format!(
                "<span class=\"hotkey-symbol{}\"><span class=\"hotkey-highlighted\">{}</span>{}</span>",
                open_class, first, rest
            )
        }
        BufferMatch::None => format!(
            "<span class=\"hotkey-symbol{}\">{}</span>",
            open_class, display
        ),
    }
}
