//! Built-in font table
//!
//! Core X fonts are mapped onto host font families. The table is built once
//! when the connection opens and never changes; loading a font only binds a
//! font ID to one of its entries.

use crate::backend::HostFont;
use crate::protocol::*;
use std::collections::HashMap;

/// One loadable core font
#[derive(Debug, Clone)]
pub struct FontEntry {
    /// XLFD or alias the font is listed under
    pub name: String,
    pub family: &'static str,
    pub style: &'static str,
    /// Pixel size
    pub size: u16,
    pub ascent: i16,
    pub descent: i16,
    /// Cell width for monospaced fonts, average width otherwise
    pub char_width: i16,
    pub monospace: bool,
}

impl FontEntry {
    fn new(name: &str, family: &'static str, style: &'static str, size: u16, monospace: bool) -> Self {
        let ascent = ((size as u32 * 4 + 2) / 5) as i16;
        let char_width = if monospace {
            ((size as u32 * 3 + 2) / 5) as i16
        } else {
            ((size as u32 * 11 + 10) / 20) as i16
        };
        FontEntry {
            name: name.to_string(),
            family,
            style,
            size,
            ascent,
            descent: size as i16 - ascent,
            char_width,
            monospace,
        }
    }

    pub fn host_font(&self) -> HostFont {
        HostFont {
            family: self.family.to_string(),
            style: self.style.to_string(),
            size: self.size as f32,
        }
    }

    fn glyph_width(&self, c: char) -> i32 {
        if self.monospace {
            return self.char_width as i32;
        }
        let size = self.size as i32;
        match c {
            'i' | 'j' | 'l' | '.' | ',' | ':' | ';' | '\'' | '!' | '|' => (size * 3 + 5) / 10,
            'm' | 'w' | 'M' | 'W' => (size * 17 + 10) / 20,
            ' ' => (size * 3 + 5) / 10,
            _ => self.char_width as i32,
        }
    }

    /// Pixel width of `text`
    pub fn text_width(&self, text: &str) -> i32 {
        text.chars().map(|c| self.glyph_width(c)).sum()
    }

    pub fn metrics(&self, fid: Font) -> FontMetrics {
        let max_width = if self.monospace {
            self.char_width
        } else {
            ((self.size as u32 * 17 + 10) / 20) as i16
        };
        FontMetrics {
            fid,
            ascent: self.ascent,
            descent: self.descent,
            min_char: 0x20,
            max_char: 0xff,
            min_width: if self.monospace {
                self.char_width
            } else {
                ((self.size as u32 * 3 + 5) / 10) as i16
            },
            max_width,
            default_char: 0x20,
        }
    }
}

/// What `query_font` reports
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontMetrics {
    pub fid: Font,
    pub ascent: i16,
    pub descent: i16,
    pub min_char: u16,
    pub max_char: u16,
    pub min_width: i16,
    pub max_width: i16,
    pub default_char: u16,
}

/// Case-insensitive match with `*` (any run) and `?` (any one character)
pub fn wildcard_match(pattern: &str, name: &str) -> bool {
    let p: Vec<char> = pattern.to_lowercase().chars().collect();
    let n: Vec<char> = name.to_lowercase().chars().collect();
    let (mut pi, mut ni) = (0, 0);
    // position of the last '*' and the name index it was tried at
    let mut backtrack: Option<(usize, usize)> = None;
    while ni < n.len() {
        if pi < p.len() && (p[pi] == '?' || p[pi] == n[ni]) {
            pi += 1;
            ni += 1;
        } else if pi < p.len() && p[pi] == '*' {
            backtrack = Some((pi, ni));
            pi += 1;
        } else if let Some((star, at)) = backtrack {
            pi = star + 1;
            ni = at + 1;
            backtrack = Some((star, at + 1));
        } else {
            return false;
        }
    }
    p[pi..].iter().all(|c| *c == '*')
}

fn builtin_entries() -> Vec<FontEntry> {
    let mut entries = vec![
        FontEntry::new("fixed", "monospace", "Regular", 13, true),
        FontEntry::new("6x13", "monospace", "Regular", 13, true),
        FontEntry::new("7x14", "monospace", "Regular", 14, true),
        FontEntry::new("8x13", "monospace", "Regular", 13, true),
        FontEntry::new("9x15", "monospace", "Regular", 15, true),
        FontEntry::new("10x20", "monospace", "Regular", 20, true),
        FontEntry::new("cursor", "monospace", "Regular", 16, true),
    ];
    let families: &[(&str, &str, &'static str, bool)] = &[
        ("misc", "fixed", "monospace", true),
        ("adobe", "courier", "monospace", true),
        ("adobe", "helvetica", "sans-serif", false),
        ("adobe", "times", "serif", false),
    ];
    let weights: &[(&str, &str, &'static str)] = &[
        ("medium", "r", "Regular"),
        ("bold", "r", "Bold"),
        ("medium", "o", "Italic"),
    ];
    for (foundry, family, host_family, mono) in families {
        for (weight, slant, style) in weights {
            for size in [10u16, 12, 14, 18, 24] {
                let spacing = if *mono { "m" } else { "p" };
                let name = format!(
                    "-{}-{}-{}-{}-normal--{}-{}-75-75-{}-{}-iso8859-1",
                    foundry,
                    family,
                    weight,
                    slant,
                    size,
                    size * 10,
                    spacing,
                    size * 6
                );
                entries.push(FontEntry::new(&name, *host_family, *style, size, *mono));
            }
        }
    }
    entries
}

/// Fonts available to the connection plus the IDs currently loaded
#[derive(Debug)]
pub struct FontTable {
    entries: Vec<FontEntry>,
    loaded: HashMap<Font, usize>,
}

impl Default for FontTable {
    fn default() -> Self {
        Self::new()
    }
}

impl FontTable {
    pub fn new() -> Self {
        FontTable {
            entries: builtin_entries(),
            loaded: HashMap::new(),
        }
    }

    /// Names matching `pattern`, at most `max_names`
    pub fn list(&self, pattern: &str, max_names: usize) -> Vec<String> {
        self.entries
            .iter()
            .filter(|e| wildcard_match(pattern, &e.name))
            .take(max_names)
            .map(|e| e.name.clone())
            .collect()
    }

    /// Bind `fid` to the first entry matching `name`
    pub fn load(&mut self, fid: Font, name: &str) -> X11Result<()> {
        let index = self
            .entries
            .iter()
            .position(|e| wildcard_match(name, &e.name))
            .ok_or_else(|| X11Error::bad_name("XLoadFont"))?;
        log::debug!("loaded font {} as {}", self.entries[index].name, fid);
        self.loaded.insert(fid, index);
        Ok(())
    }

    pub fn unload(&mut self, fid: Font) -> X11Result<()> {
        self.loaded
            .remove(&fid)
            .map(|_| ())
            .ok_or_else(|| X11Error::bad_font(fid, "XUnloadFont"))
    }

    pub fn get(&self, fid: Font) -> Option<&FontEntry> {
        self.loaded.get(&fid).map(|i| &self.entries[*i])
    }

    pub fn host_font(&self, fid: Font) -> Option<HostFont> {
        self.get(fid).map(FontEntry::host_font)
    }

    pub fn query(&self, fid: Font) -> X11Result<FontMetrics> {
        self.get(fid)
            .map(|e| e.metrics(fid))
            .ok_or_else(|| X11Error::bad_font(fid, "XQueryFont"))
    }

    pub fn text_width(&self, fid: Font, text: &str) -> X11Result<i32> {
        self.get(fid)
            .map(|e| e.text_width(text))
            .ok_or_else(|| X11Error::bad_font(fid, "XTextWidth"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wildcards() {
        assert!(wildcard_match("*", "fixed"));
        assert!(wildcard_match("FIX?D", "fixed"));
        assert!(wildcard_match("-*-helvetica-bold-*", "-adobe-helvetica-bold-r-normal--12-120-75-75-p-72-iso8859-1"));
        assert!(!wildcard_match("*-times-*", "-adobe-helvetica-bold-r-normal--12"));
        assert!(wildcard_match("a*b*c", "axxbyyc"));
        assert!(!wildcard_match("a*b*c", "axxbyy"));
        assert!(!wildcard_match("fixed", "fixedx"));
    }

    #[test]
    fn test_list_respects_limit() {
        let table = FontTable::new();
        let all = table.list("*", usize::MAX);
        assert!(all.len() > 10);
        assert_eq!(table.list("*", 3).len(), 3);
        assert!(table.list("nonexistent*", 10).is_empty());
    }

    #[test]
    fn test_load_query_unload() {
        let mut table = FontTable::new();
        let fid = Font::new(0x300);
        table.load(fid, "*-courier-medium-r-*-14-*").unwrap();
        let metrics = table.query(fid).unwrap();
        assert_eq!(metrics.ascent + metrics.descent, 14);
        assert_eq!(table.text_width(fid, "abcd").unwrap(), 4 * metrics.max_width as i32);
        assert_eq!(table.host_font(fid).unwrap().family, "monospace");
        table.unload(fid).unwrap();
        assert_eq!(table.query(fid).unwrap_err().code, ErrorCode::Font);
    }

    #[test]
    fn test_unknown_font_is_bad_name() {
        let mut table = FontTable::new();
        let err = table.load(Font::new(0x300), "-no-such-font-*").unwrap_err();
        assert_eq!(err.code, ErrorCode::Name);
    }
}
