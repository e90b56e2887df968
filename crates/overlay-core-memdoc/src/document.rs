//! Block/span document model.
//!
//! A document is a list of blocks (paragraphs); each block is a run of text spans, and a span
//! may belong to one link. Spans are the engine's text nodes: their keys are what
//! [`SelectionPoint::node`](overlay_core::SelectionPoint::node) refers to, so splitting a span
//! keeps the key on the left half and gives the right half a fresh one.
//!
//! Offsets are in `char`s, counted from the start of the block (or span).

use std::collections::BTreeMap;
use std::sync::LazyLock;

use overlay_core::{EngineError, LinkAttributes, LinkKind, LinkNode, NodeKey, TextAlignment};
use regex::Regex;

/// `[text](url)` in [`Document::from_markup`] input.
static MARKUP_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[([^\]\n]+)\]\(([^)\s]+)\)").expect("valid markup link pattern")
});

/// Bare URLs and e-mail addresses picked up by [`Document::detect_auto_links`].
static AUTO_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?x)
        (?P<url>(?:https?://|www\.)[^\s<>()\[\]]*[^\s<>()\[\].,;:!?'\x22])
        | (?P<email>[A-Za-z0-9._%+-]+@[A-Za-z0-9-]+(?:\.[A-Za-z0-9-]+)*\.[A-Za-z]{2,})
        ",
    )
    .expect("valid auto-link pattern")
});

/// A position inside the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct DocPosition {
    /// Block index.
    pub block: usize,
    /// Character offset inside the block.
    pub offset: usize,
}

impl DocPosition {
    /// Create a position.
    pub fn new(block: usize, offset: usize) -> Self {
        Self { block, offset }
    }
}

/// A text node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    /// Node key.
    pub key: NodeKey,
    /// Text content (never contains `'\n'`).
    pub text: String,
    /// The link this span belongs to.
    pub link: Option<NodeKey>,
}

impl Span {
    /// Length in chars.
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    /// Returns `true` for an empty span.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// A paragraph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    /// Text alignment.
    pub alignment: TextAlignment,
    /// Text nodes, never empty (an empty block holds one empty span).
    pub spans: Vec<Span>,
}

impl Block {
    /// Plain text of the block.
    pub fn text(&self) -> String {
        self.spans.iter().map(|span| span.text.as_str()).collect()
    }

    /// Length in chars.
    pub fn len(&self) -> usize {
        self.spans.iter().map(Span::len).sum()
    }

    /// Returns `true` if the block holds no text.
    pub fn is_empty(&self) -> bool {
        self.spans.iter().all(Span::is_empty)
    }

    /// `(start, end)` block offsets of every span.
    fn span_bounds(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.spans.iter().scan(0usize, |start, span| {
            let bounds = (*start, *start + span.len());
            *start = bounds.1;
            Some(bounds)
        })
    }
}

/// Which span a position on a span boundary belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bias {
    /// The span ending at the position.
    Backward,
    /// The span starting at the position.
    Forward,
}

/// A document position resolved to a span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedPoint {
    /// Block index.
    pub block: usize,
    /// Span index inside the block.
    pub span: usize,
    /// Offset inside the span.
    pub offset: usize,
    /// `offset` equals the span length.
    pub at_end: bool,
}

/// The document.
#[derive(Debug, Clone)]
pub struct Document {
    blocks: Vec<Block>,
    links: BTreeMap<NodeKey, LinkNode>,
    next_key: u32,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// A document with one empty block.
    pub fn new() -> Self {
        let mut document = Self {
            blocks: Vec::new(),
            links: BTreeMap::new(),
            next_key: 0,
        };
        let block = document.empty_block();
        document.blocks.push(block);
        document
    }

    /// Parse lines of text with `[text](url)` links. Each line becomes a block.
    pub fn from_markup(source: &str) -> Self {
        let mut document = Self {
            blocks: Vec::new(),
            links: BTreeMap::new(),
            next_key: 0,
        };
        for line in source.split('\n') {
            let block = document.parse_line(line);
            document.blocks.push(block);
        }
        document
    }

    fn parse_line(&mut self, line: &str) -> Block {
        let mut spans = Vec::new();
        let mut last = 0;
        for caps in MARKUP_LINK.captures_iter(line) {
            let (Some(whole), Some(text), Some(url)) = (caps.get(0), caps.get(1), caps.get(2))
            else {
                continue;
            };
            if whole.start() > last {
                spans.push(self.plain_span(&line[last..whole.start()]));
            }
            let link = self.create_link(LinkKind::Manual, LinkAttributes::new(url.as_str()));
            let key = self.alloc_key();
            spans.push(Span {
                key,
                text: text.as_str().to_string(),
                link: Some(link),
            });
            last = whole.end();
        }
        if last < line.len() || spans.is_empty() {
            spans.push(self.plain_span(&line[last..]));
        }
        Block {
            alignment: TextAlignment::Start,
            spans,
        }
    }

    fn alloc_key(&mut self) -> NodeKey {
        self.next_key += 1;
        NodeKey(self.next_key)
    }

    fn plain_span(&mut self, text: &str) -> Span {
        Span {
            key: self.alloc_key(),
            text: text.to_string(),
            link: None,
        }
    }

    fn empty_block(&mut self) -> Block {
        Block {
            alignment: TextAlignment::Start,
            spans: vec![self.plain_span("")],
        }
    }

    fn create_link(&mut self, kind: LinkKind, attributes: LinkAttributes) -> NodeKey {
        let key = self.alloc_key();
        self.links.insert(
            key,
            LinkNode {
                key,
                kind,
                attributes,
            },
        );
        key
    }

    /// All blocks.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// One block.
    pub fn block(&self, index: usize) -> Option<&Block> {
        self.blocks.get(index)
    }

    /// Set a block's alignment.
    pub fn set_alignment(&mut self, block: usize, alignment: TextAlignment) {
        if let Some(block) = self.blocks.get_mut(block) {
            block.alignment = alignment;
        }
    }

    /// A link node.
    pub fn link(&self, key: NodeKey) -> Option<&LinkNode> {
        self.links.get(&key)
    }

    /// All link nodes in key order.
    pub fn links(&self) -> impl Iterator<Item = &LinkNode> {
        self.links.values()
    }

    /// The link a span belongs to.
    pub fn link_of(&self, span: &Span) -> Option<LinkNode> {
        span.link.and_then(|key| self.links.get(&key)).cloned()
    }

    /// Whole document text, blocks separated by `'\n'`.
    pub fn text(&self) -> String {
        self.blocks
            .iter()
            .map(Block::text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Text of the link `key`, concatenated over its spans.
    pub fn link_text(&self, key: NodeKey) -> String {
        self.blocks
            .iter()
            .flat_map(|block| &block.spans)
            .filter(|span| span.link == Some(key))
            .map(|span| span.text.as_str())
            .collect()
    }

    /// First occurrence of `needle` inside a single block.
    pub fn find(&self, needle: &str) -> Option<(DocPosition, DocPosition)> {
        self.blocks.iter().enumerate().find_map(|(index, block)| {
            let text = block.text();
            let byte = text.find(needle)?;
            let start = text[..byte].chars().count();
            let end = start + needle.chars().count();
            Some((DocPosition::new(index, start), DocPosition::new(index, end)))
        })
    }

    /// Clamp a position into the document.
    pub fn clamp(&self, position: DocPosition) -> DocPosition {
        let block = position.block.min(self.blocks.len().saturating_sub(1));
        let len = self.blocks.get(block).map_or(0, Block::len);
        DocPosition::new(block, position.offset.min(len))
    }

    /// Resolve a position to the span holding it.
    pub fn resolve(&self, position: DocPosition, bias: Bias) -> Option<ResolvedPoint> {
        let block = self.blocks.get(position.block)?;
        if position.offset > block.len() {
            return None;
        }
        let bounds: Vec<(usize, usize)> = block.span_bounds().collect();
        let backward = || {
            bounds
                .iter()
                .position(|&(start, end)| start < position.offset && position.offset <= end)
        };
        let forward = || {
            bounds
                .iter()
                .position(|&(start, end)| start <= position.offset && position.offset < end)
        };
        let index = match bias {
            Bias::Backward => backward().or_else(forward),
            Bias::Forward => forward().or_else(backward),
        }
        .unwrap_or(0);
        let (start, end) = bounds.get(index).copied().unwrap_or((0, 0));
        Some(ResolvedPoint {
            block: position.block,
            span: index,
            offset: position.offset - start,
            at_end: position.offset == end,
        })
    }

    /// The span behind a resolved point.
    pub fn span(&self, point: &ResolvedPoint) -> Option<&Span> {
        self.blocks.get(point.block)?.spans.get(point.span)
    }

    /// Map a text node and offset back to a document position.
    pub fn position_of(&self, node: NodeKey, offset: usize) -> Option<DocPosition> {
        self.blocks.iter().enumerate().find_map(|(index, block)| {
            block
                .spans
                .iter()
                .zip(block.span_bounds())
                .find(|(span, _)| span.key == node)
                .filter(|(span, _)| offset <= span.len())
                .map(|(_, (start, _))| DocPosition::new(index, start + offset))
        })
    }

    /// Spans with at least one character inside `start..end`, in document order.
    pub fn spans_in(&self, start: DocPosition, end: DocPosition) -> Vec<&Span> {
        let mut out = Vec::new();
        for (index, block) in self.blocks.iter().enumerate() {
            if index < start.block || index > end.block {
                continue;
            }
            let from = if index == start.block { start.offset } else { 0 };
            let to = if index == end.block {
                end.offset
            } else {
                usize::MAX
            };
            for (span, (s, e)) in block.spans.iter().zip(block.span_bounds()) {
                if s < to && e > from && !span.is_empty() {
                    out.push(span);
                }
            }
        }
        out
    }

    /// Text between two ordered positions, blocks separated by `'\n'`.
    pub fn text_between(&self, start: DocPosition, end: DocPosition) -> String {
        let mut out = String::new();
        for index in start.block..=end.block {
            let Some(block) = self.blocks.get(index) else {
                break;
            };
            let text = block.text();
            let from = if index == start.block { start.offset } else { 0 };
            let to = if index == end.block {
                end.offset
            } else {
                usize::MAX
            };
            out.extend(text.chars().skip(from).take(to.saturating_sub(from)));
            if index != end.block {
                out.push('\n');
            }
        }
        out
    }

    /// Ensure a span boundary at `position`.
    fn split_at(&mut self, position: DocPosition) {
        let Some(block) = self.blocks.get(position.block) else {
            return;
        };
        let split = block
            .span_bounds()
            .enumerate()
            .find(|&(_, (start, end))| start < position.offset && position.offset < end)
            .map(|(index, (start, _))| (index, position.offset - start));
        let Some((index, at)) = split else {
            return;
        };
        let key = self.alloc_key();
        let block = &mut self.blocks[position.block];
        let span = &mut block.spans[index];
        let byte = span
            .text
            .char_indices()
            .nth(at)
            .map_or(span.text.len(), |(byte, _)| byte);
        let right = Span {
            key,
            text: span.text.split_off(byte),
            link: span.link,
        };
        block.spans.insert(index + 1, right);
    }

    /// Wrap `start..end` in a new manual link. Links previously inside the range are
    /// replaced for the wrapped part.
    pub fn wrap(
        &mut self,
        start: DocPosition,
        end: DocPosition,
        attributes: LinkAttributes,
    ) -> NodeKey {
        self.split_at(end);
        self.split_at(start);
        let link = self.create_link(LinkKind::Manual, attributes);
        for (index, block) in self.blocks.iter_mut().enumerate() {
            if index < start.block || index > end.block {
                continue;
            }
            let from = if index == start.block { start.offset } else { 0 };
            let to = if index == end.block {
                end.offset
            } else {
                usize::MAX
            };
            let bounds: Vec<(usize, usize)> = block.span_bounds().collect();
            for (span, (s, e)) in block.spans.iter_mut().zip(bounds) {
                if s >= from && e <= to && s < e {
                    span.link = Some(link);
                }
            }
        }
        self.prune_links();
        link
    }

    /// Change a link's attributes in place.
    pub fn update_link(
        &mut self,
        key: NodeKey,
        attributes: LinkAttributes,
    ) -> Result<(), EngineError> {
        let link = self.links.get_mut(&key).ok_or(EngineError::UnknownNode(key))?;
        link.attributes = attributes;
        Ok(())
    }

    /// Remove links, leaving their text in place.
    pub fn unwrap_links(&mut self, keys: &[NodeKey]) {
        for span in self.blocks.iter_mut().flat_map(|block| block.spans.iter_mut()) {
            if span.link.is_some_and(|link| keys.contains(&link)) {
                span.link = None;
            }
        }
        self.prune_links();
    }

    /// Replace link `key` by a new manual link with `attributes`, keeping its text.
    pub fn replace_link(
        &mut self,
        key: NodeKey,
        attributes: LinkAttributes,
    ) -> Result<NodeKey, EngineError> {
        if !self.links.contains_key(&key) {
            return Err(EngineError::UnknownNode(key));
        }
        let replacement = self.create_link(LinkKind::Manual, attributes);
        for span in self.blocks.iter_mut().flat_map(|block| block.spans.iter_mut()) {
            if span.link == Some(key) {
                span.link = Some(replacement);
            }
        }
        self.links.remove(&key);
        Ok(replacement)
    }

    /// Mark an auto-detected link as unlinked by the user; it stays a node but renders as
    /// plain text.
    pub fn unlink_auto_link(&mut self, key: NodeKey) -> Result<(), EngineError> {
        let link = self.links.get_mut(&key).ok_or(EngineError::UnknownNode(key))?;
        match &mut link.kind {
            LinkKind::Auto { unlinked } => {
                *unlinked = true;
                Ok(())
            }
            LinkKind::Manual => Err(EngineError::NotALink(key)),
        }
    }

    /// Turn bare URLs and e-mail addresses in unlinked text into auto links.
    ///
    /// Returns the number of links created.
    pub fn detect_auto_links(&mut self) -> usize {
        let mut created = 0;
        for block_index in 0..self.blocks.len() {
            let spans = std::mem::take(&mut self.blocks[block_index].spans);
            let mut rebuilt = Vec::with_capacity(spans.len());
            for span in spans {
                if span.link.is_some() || !AUTO_LINK.is_match(&span.text) {
                    rebuilt.push(span);
                    continue;
                }
                created += self.split_auto_links(span, &mut rebuilt);
            }
            self.blocks[block_index].spans = rebuilt;
        }
        if created > 0 {
            tracing::debug!(created, "auto links detected");
        }
        created
    }

    fn split_auto_links(&mut self, span: Span, out: &mut Vec<Span>) -> usize {
        let mut created = 0;
        let mut last = 0;
        // The first piece keeps the original node key.
        let mut first_key = Some(span.key);

        for caps in AUTO_LINK.captures_iter(&span.text) {
            let (url, matched) = if let Some(m) = caps.name("url") {
                let text = m.as_str();
                let url = if text.starts_with("www.") {
                    format!("https://{text}")
                } else {
                    text.to_string()
                };
                (url, m)
            } else if let Some(m) = caps.name("email") {
                (format!("mailto:{}", m.as_str()), m)
            } else {
                continue;
            };
            if matched.start() > last {
                let key = first_key.take().unwrap_or_else(|| self.alloc_key());
                out.push(Span {
                    key,
                    text: span.text[last..matched.start()].to_string(),
                    link: None,
                });
            }
            let link = self.create_link(
                LinkKind::Auto { unlinked: false },
                LinkAttributes::new(url),
            );
            let key = first_key.take().unwrap_or_else(|| self.alloc_key());
            out.push(Span {
                key,
                text: matched.as_str().to_string(),
                link: Some(link),
            });
            created += 1;
            last = matched.end();
        }
        if last < span.text.len() {
            let key = first_key.take().unwrap_or_else(|| self.alloc_key());
            out.push(Span {
                key,
                text: span.text[last..].to_string(),
                link: None,
            });
        }
        created
    }

    fn prune_links(&mut self) {
        let used: Vec<NodeKey> = self
            .blocks
            .iter()
            .flat_map(|block| &block.spans)
            .filter_map(|span| span.link)
            .collect();
        self.links.retain(|key, _| used.contains(key));
    }
}
