//! Description trimming for DuckDuckGo abstracts.
//!
//! The input is a flattened markup string containing only `<code>`, `<i>`
//! and `<b>` tags (see [`crate::ddg::page`]). The trimmer removes oversized
//! parenthesized asides, splits the text into sentences at top-level
//! periods, and applies sentence/character budgets, all without touching
//! text inside the kept inline tags.
//!
//! `i.e.` and `that is,` are replaced by private-use sentinel characters up
//! front so their periods and commas don't confuse the splitting logic; the
//! sentinels are restored at the end. The exact code points don't matter as
//! long as they never occur in real documentation text.

use std::sync::LazyLock;

use regex::Regex;

pub(crate) const SENTINEL_IE: char = '\u{e000}';
pub(crate) const SENTINEL_THAT_IS: char = '\u{e001}';

static RE_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new("</?(?:code|i|b)>").unwrap());

/// Limits applied to a description.
#[derive(Debug, Clone)]
pub struct DescOptions {
    pub max_sentences: usize,
    pub max_chars: usize,
    /// Parenthesized runs longer than this are removed.
    pub max_paren_chars: usize,
}

impl Default for DescOptions {
    fn default() -> Self {
        DescOptions {
            max_sentences: 1,
            max_chars: 200,
            max_paren_chars: 40,
        }
    }
}

/// Calls `f(pos, chunk)` for every maximal run of text outside inline tags.
/// `pos` is the chunk's byte offset in `text`.
fn for_top_text<'a>(text: &'a str, mut f: impl FnMut(usize, &'a str)) {
    let mut last_close = 0;
    let mut depth = 0i32;
    for m in RE_TAG.find_iter(text) {
        if !m.as_str().starts_with("</") {
            if depth == 0 {
                f(last_close, &text[last_close..m.start()]);
            }
            depth += 1;
        } else {
            depth -= 1;
            if depth == 0 {
                last_close = m.end();
            }
        }
    }
    if depth == 0 {
        f(last_close, &text[last_close..]);
    }
}

/// Removes top-level parenthesized runs that exceed `max_paren_chars`, or
/// that contain a protected sentinel (those read badly mid-abstract no
/// matter how short). Parentheses inside inline tags are never counted.
fn remove_parentheses(desc: &str, max_paren_chars: usize) -> String {
    let mut depth = 0i32;
    let mut open_pos = 0usize;
    let mut del_ranges: Vec<(usize, usize)> = Vec::new();

    for_top_text(desc, |pos, chunk| {
        for (i, c) in chunk.char_indices() {
            match c {
                '(' => {
                    if depth == 0 {
                        open_pos = pos + i;
                    }
                    depth += 1;
                }
                ')' => {
                    depth -= 1;
                    if depth == 0 {
                        let end = pos + i + 1;
                        let run = &desc[open_pos..end];
                        if end - open_pos > max_paren_chars
                            || run.contains([SENTINEL_IE, SENTINEL_THAT_IS])
                        {
                            del_ranges.push((open_pos, end));
                        }
                    }
                }
                _ => {}
            }
        }
    });

    let mut out = desc.to_string();
    for &(begin, end) in del_ranges.iter().rev() {
        out.replace_range(begin..end, "");
    }
    out
}

/// Splits at top-level periods; a trailing fragment without a period is
/// kept as a final sentence.
fn split_sentences(desc: &str) -> Vec<String> {
    let mut boundaries = Vec::new();
    for_top_text(desc, |pos, chunk| {
        for (i, c) in chunk.char_indices() {
            if c == '.' {
                boundaries.push(pos + i);
            }
        }
    });

    let mut sentences = Vec::new();
    let mut start = 0;
    for b in boundaries {
        sentences.push(desc[start..=b].to_string());
        start = b + 1;
    }
    if !desc[start..].trim().is_empty() {
        sentences.push(desc[start..].to_string());
    }
    sentences
}

fn strip_trailing_punctuation(sentence: &str) -> &str {
    sentence.trim_end_matches([' ', '.', ',', ':', ';', '-'])
}

/// Cuts a sentence near `max_chars` at a word boundary, only ever splitting
/// inside a top-level text chunk.
fn trim_at_word(sentence: &str, max_chars: usize) -> String {
    let mut chunk_pos = 0;
    let mut chunk_text = "";
    for_top_text(sentence, |pos, chunk| {
        if pos <= max_chars {
            chunk_pos = pos;
            chunk_text = chunk;
        }
    });

    let words: Vec<&str> = chunk_text.split(' ').collect();
    let mut last_word = 0;
    let mut curr_pos = chunk_pos;
    for (i, word) in words.iter().enumerate() {
        curr_pos += word.len() + 1;
        if curr_pos > max_chars {
            break;
        }
        last_word = i;
    }
    let kept = words[..=last_word].join(" ");
    format!("{}{}", &sentence[..chunk_pos], kept)
}

/// Trims one over-long sentence, preferring a cut at a protected sentinel.
fn trim_single_sentence(text: &str, max_chars: usize) -> String {
    if text.len() <= max_chars {
        return text.to_string();
    }

    let mut sentinel_pos: Option<usize> = None;
    for_top_text(text, |pos, chunk| {
        if sentinel_pos.is_none() {
            if let Some(i) = chunk.find([SENTINEL_IE, SENTINEL_THAT_IS]) {
                sentinel_pos = Some(pos + i);
            }
        }
    });

    if let Some(pos) = sentinel_pos {
        if pos <= 2 {
            return String::new();
        }
        let cut = if pos > max_chars {
            trim_at_word(text, max_chars)
        } else {
            text[..pos].to_string()
        };
        return format!("{}...", strip_trailing_punctuation(&cut));
    }

    format!("{}...", strip_trailing_punctuation(&trim_at_word(text, max_chars)))
}

/// Produces the final one-or-few-sentence description from flattened markup.
pub fn trim_description(desc: &str, opts: &DescOptions) -> String {
    // the abstract format cannot contain raw newlines
    let desc = desc.replace('\n', " ");
    let desc = desc
        .trim()
        .replace("i.e.", &SENTINEL_IE.to_string())
        .replace("that is,", &SENTINEL_THAT_IS.to_string());

    let desc = remove_parentheses(&desc, opts.max_paren_chars);
    let mut sentences = split_sentences(&desc);
    if sentences.is_empty() {
        return String::new();
    }

    if sentences.len() > opts.max_sentences {
        sentences.truncate(opts.max_sentences);
    }

    // coarse character budget over whole sentences
    let mut char_count = 0;
    let mut last_sentence = sentences.len();
    for (i, s) in sentences.iter().enumerate() {
        char_count += s.len();
        if char_count > opts.max_chars {
            last_sentence = i + 1;
            break;
        }
    }
    sentences.truncate(last_sentence);

    if char_count > opts.max_chars && sentences.len() == 1 {
        sentences[0] = trim_single_sentence(&sentences[0], opts.max_chars);
    } else if let Some(last) = sentences.last_mut() {
        let trimmed = last.trim_end();
        if !trimmed.ends_with('.') {
            *last = format!("{}.", strip_trailing_punctuation(trimmed));
        }
    }

    sentences
        .join("\n")
        .replace(SENTINEL_IE, "i.e.")
        .replace(SENTINEL_THAT_IS, "that is,")
}
