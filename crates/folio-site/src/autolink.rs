//! Bare URL and email linking for markdown text.
//!
//! CommonMark only links `<https://...>`. Plain `https://...`, `www.` hosts
//! and email addresses in prose are found with `linkify` and wrapped in
//! link events before HTML is written. Text inside links, images and code
//! blocks is left alone.

use std::collections::VecDeque;

use linkify::{Link, LinkFinder, LinkKind};
use pulldown_cmark::{CowStr, Event, LinkType, Tag, TagEnd};

/// Event stream adapter that links bare URLs in text events.
pub(crate) struct Autolink<'a, I> {
    inner: I,
    finder: LinkFinder,
    queue: VecDeque<Event<'a>>,
    link_depth: usize,
    in_code_block: bool,
}

impl<'a, I> Autolink<'a, I>
where
    I: Iterator<Item = Event<'a>>,
{
    pub(crate) fn new(inner: I) -> Self {
        let mut finder = LinkFinder::new();
        finder.url_must_have_scheme(false);
        finder.kinds(&[LinkKind::Url, LinkKind::Email]);
        Self {
            inner,
            finder,
            queue: VecDeque::new(),
            link_depth: 0,
            in_code_block: false,
        }
    }

    /// Queue `text` split into text and link events. Queues nothing when
    /// the text holds no link.
    fn split(&mut self, text: &str) {
        let mut last = 0;
        for link in self.finder.links(text) {
            let Some((link_type, dest_url)) = target(&link) else {
                continue;
            };
            if link.start() > last {
                self.queue.push_back(Event::Text(text[last..link.start()].to_owned().into()));
            }
            self.queue.push_back(Event::Start(Tag::Link {
                link_type,
                dest_url: dest_url.into(),
                title: CowStr::Borrowed(""),
                id: CowStr::Borrowed(""),
            }));
            self.queue.push_back(Event::Text(link.as_str().to_owned().into()));
            self.queue.push_back(Event::End(TagEnd::Link));
            last = link.end();
        }
        if last > 0 && last < text.len() {
            self.queue.push_back(Event::Text(text[last..].to_owned().into()));
        }
    }
}

impl<'a, I> Iterator for Autolink<'a, I>
where
    I: Iterator<Item = Event<'a>>,
{
    type Item = Event<'a>;

    fn next(&mut self) -> Option<Event<'a>> {
        if let Some(event) = self.queue.pop_front() {
            return Some(event);
        }

        let event = self.inner.next()?;
        match &event {
            Event::Start(Tag::Link { .. } | Tag::Image { .. }) => self.link_depth += 1,
            Event::End(TagEnd::Link | TagEnd::Image) => self.link_depth = self.link_depth.saturating_sub(1),
            Event::Start(Tag::CodeBlock(_)) => self.in_code_block = true,
            Event::End(TagEnd::CodeBlock) => self.in_code_block = false,
            Event::Text(text) if self.link_depth == 0 && !self.in_code_block => {
                self.split(text);
                if let Some(first) = self.queue.pop_front() {
                    return Some(first);
                }
            }
            _ => {}
        }
        Some(event)
    }
}

/// Link type and destination for a found link. Scheme-less matches other
/// than `www.` hosts (file names such as `config.toml`) are not linked.
fn target(link: &Link<'_>) -> Option<(LinkType, String)> {
    let text = link.as_str();
    match link.kind() {
        LinkKind::Email => Some((LinkType::Email, text.to_owned())),
        LinkKind::Url if text.contains("://") => Some((LinkType::Autolink, text.to_owned())),
        LinkKind::Url if text.starts_with("www.") => Some((LinkType::Autolink, format!("http://{text}"))),
        _ => None,
    }
}
