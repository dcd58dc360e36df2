//! Module hierarchy derived from resource addresses
//!
//! An address is a dot-separated path such as
//! `module.network.module.subnets.aws_subnet.private["a"]`. Module calls are
//! always leading `module.<name>` segment pairs; everything after them names
//! the resource itself. Dots inside `[...]` index keys do not split segments.

/// Keyword that introduces a module call segment
pub const MODULE_KEYWORD: &str = "module";

/// A segment of an address and its byte offset
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Segment<'a> {
    pub offset: usize,
    pub text: &'a str,
}

impl Segment<'_> {
    fn end(&self) -> usize {
        self.offset + self.text.len()
    }
}

/// Split an address on `.`, keeping index keys like `["a.b"]` intact
pub fn segments(address: &str) -> Vec<Segment<'_>> {
    let mut out = Vec::new();
    let mut bracket_depth = 0usize;
    let mut in_quotes = false;
    let mut start = 0;

    for (i, c) in address.char_indices() {
        match c {
            '"' if bracket_depth > 0 => in_quotes = !in_quotes,
            '[' if !in_quotes => bracket_depth += 1,
            ']' if !in_quotes => bracket_depth = bracket_depth.saturating_sub(1),
            '.' if bracket_depth == 0 => {
                out.push(Segment {
                    offset: start,
                    text: &address[start..i],
                });
                start = i + 1;
            }
            _ => {}
        }
    }
    out.push(Segment {
        offset: start,
        text: &address[start..],
    });
    out
}

/// Leading `module.<name>` pairs, outermost first, as (keyword, name) segments
fn module_calls(address: &str) -> Vec<(Segment<'_>, Segment<'_>)> {
    let segs = segments(address);
    let mut calls = Vec::new();
    let mut i = 0;
    while i + 1 < segs.len() && segs[i].text == MODULE_KEYWORD {
        calls.push((segs[i], segs[i + 1]));
        i += 2;
    }
    calls
}

/// Full module path, e.g. `module.network.module.subnets`
pub fn module_path(address: &str) -> Option<&str> {
    let calls = module_calls(address);
    let (_, name) = calls.last()?;
    Some(&address[..name.end()])
}

/// Outermost module, e.g. `module.network`
pub fn top_level_module(address: &str) -> Option<&str> {
    let calls = module_calls(address);
    let (_, name) = calls.first()?;
    Some(&address[..name.end()])
}

/// Innermost module, e.g. `module.subnets`
pub fn leaf_module(address: &str) -> Option<&str> {
    let calls = module_calls(address);
    let (keyword, name) = calls.last()?;
    Some(&address[keyword.offset..name.end()])
}

/// Number of nested module calls; 0 for root-module resources
pub fn module_depth(address: &str) -> usize {
    module_calls(address).len()
}
