//! XML rendering of a [`Disc`].
//!
//! The element layout is a one-to-one mapping of the model: one `<title>` per
//! title with its chapters and clips, and per clip the primary video and audio
//! streams and the subtitle streams. Durations are written as raw ticks with
//! the `HH:MM:SS.mmm` form in a `fancy` attribute.

use std::fmt::{Display, Write};

use super::{Disc, Ticks, Title};
use crate::VERSION;

const INDENT: &str = "  ";

/// A minimal XML element tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    name: &'static str,
    attrs: Vec<(&'static str, String)>,
    text: Option<String>,
    children: Vec<Element>,
}

impl Element {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            attrs: Vec::new(),
            text: None,
            children: Vec::new(),
        }
    }

    /// Element holding only text.
    pub fn text_node(name: &'static str, text: impl Display) -> Self {
        Self::new(name).with_text(text)
    }

    pub fn attr(mut self, key: &'static str, value: impl Display) -> Self {
        self.attrs.push((key, value.to_string()));
        self
    }

    pub fn with_text(mut self, text: impl Display) -> Self {
        self.text = Some(text.to_string());
        self
    }

    /// Append a child and return it for further nesting.
    pub fn push(&mut self, child: Element) -> &mut Element {
        self.children.push(child);
        let last = self.children.len() - 1;
        &mut self.children[last]
    }

    pub fn render(&self, pretty: bool) -> String {
        let mut out = String::new();
        self.write_to(&mut out, pretty, 0);
        out
    }

    fn write_to(&self, out: &mut String, pretty: bool, depth: usize) {
        if pretty {
            for _ in 0..depth {
                out.push_str(INDENT);
            }
        }

        let _ = write!(out, "<{}", self.name);
        for (key, value) in &self.attrs {
            let _ = write!(out, " {}=\"{}\"", key, escape(value));
        }

        let text = self.text.as_deref().filter(|t| !t.is_empty());

        if text.is_none() && self.children.is_empty() {
            out.push_str("/>");
        } else if self.children.is_empty() {
            let _ = write!(out, ">{}</{}>", escape(text.unwrap_or_default()), self.name);
        } else {
            out.push('>');
            if let Some(text) = text {
                out.push_str(&escape(text));
            }
            if pretty {
                out.push('\n');
            }
            for child in &self.children {
                child.write_to(out, pretty, depth + 1);
            }
            if pretty {
                for _ in 0..depth {
                    out.push_str(INDENT);
                }
            }
            let _ = write!(out, "</{}>", self.name);
        }

        if pretty {
            out.push('\n');
        }
    }
}

/// Escape the five XML special characters.
pub fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            other => out.push(other),
        }
    }
    out
}

fn ticks_node(name: &'static str, ticks: Ticks) -> Element {
    Element::text_node(name, ticks.0).attr("fancy", ticks.fancy())
}

/// Build the element tree for a disc.
pub fn disc_element(disc: &Disc) -> Element {
    let mut root = Element::new("br")
        .attr("numtitles", disc.title_count())
        .attr("parser", format!("bluread {}", VERSION));

    root.push(Element::text_node("device", disc.device.display()));
    root.push(Element::text_node(
        "KEYDB",
        disc.keydb
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_default(),
    ));

    let mut titles = Element::new("titles");
    if let Some(main) = disc.main_title {
        titles = titles.attr("main", main);
    }
    let titles = root.push(titles);

    for title in &disc.titles {
        titles.push(title_element(title));
    }

    root
}

fn title_element(title: &Title) -> Element {
    let mut node = Element::new("title")
        .attr("idx", title.index)
        .attr("playlist", title.playlist);

    node.push(ticks_node("length", title.length));
    node.push(Element::new("angles").attr("num", title.angle_count));

    let chapters = node.push(Element::new("chapters").attr("num", title.chapter_count()));
    for chapter in &title.chapters {
        let c = chapters.push(Element::new("chapter").attr("num", chapter.number));
        c.push(ticks_node("start", chapter.start));
        c.push(ticks_node("end", chapter.end()));
        c.push(ticks_node("length", chapter.length));
        c.push(Element::text_node("clipnum", chapter.clip_ref));
    }

    let clips = node.push(Element::new("clips").attr("num", title.clip_count()));
    for clip in &title.clips {
        let c = clips.push(Element::new("clip").attr("num", clip.index));

        let videos = c.push(Element::new("videos").attr("num", clip.videos.len()));
        for s in &clip.videos {
            let v = videos.push(Element::new("video").attr("num", s.index));
            v.push(Element::text_node("Language", &s.language));
            v.push(Element::text_node("CodingType", s.coding_type));
            v.push(Element::text_node("Format", s.format));
            v.push(Element::text_node("Rate", s.rate));
            v.push(Element::text_node("Aspect", s.aspect));
        }

        let audios = c.push(Element::new("audios").attr("num", clip.audios.len()));
        for s in &clip.audios {
            let a = audios.push(Element::new("audio").attr("num", s.index));
            a.push(Element::text_node("Language", &s.language));
            a.push(Element::text_node("CodingType", s.coding_type));
            a.push(Element::text_node("Format", s.format));
            a.push(Element::text_node("Rate", s.rate));
        }

        let subs = c.push(Element::new("subtitles").attr("num", clip.subtitles.len()));
        for s in &clip.subtitles {
            let sub = subs.push(Element::new("subtitle").attr("num", s.index));
            sub.push(Element::text_node("Language", &s.language));
        }
    }

    node
}

/// Render a disc as XML, indented when `pretty` is set.
pub fn to_xml(disc: &Disc, pretty: bool) -> String {
    disc_element(disc).render(pretty)
}
