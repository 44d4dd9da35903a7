use serde::{Deserialize, Serialize};

const FENCE: &str = "```";
const DEFAULT_LANGUAGE: &str = "text";

/// One fenced code region extracted from model output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeBlock {
    pub language: String,
    pub code: String,
}

enum ScanState<'a> {
    Outside,
    Inside { language: &'a str, body: Vec<&'a str> },
}

/// Extract fenced code blocks from `text` in order of appearance.
///
/// An opening fence is a line made of ```` ``` ```` followed by an optional
/// single-word language tag. Everything up to the next fence belongs to the
/// block, whether that fence starts a line or ends one (`x = 1```), so a block
/// never runs past the nearest closing fence. Text outside fences is ignored,
/// and a fence that is never closed produces no block.
pub fn extract_code_blocks(text: &str) -> Vec<CodeBlock> {
    let mut blocks = Vec::new();
    let mut state = ScanState::Outside;

    for line in text.lines() {
        let trimmed = line.trim();
        state = match state {
            ScanState::Outside => match opening_tag(trimmed) {
                Some(language) => ScanState::Inside {
                    language,
                    body: Vec::new(),
                },
                None => ScanState::Outside,
            },
            ScanState::Inside { language, mut body } => {
                if let Some(at) = line.find(FENCE) {
                    // A fence may close the block at the end of a code line.
                    let last = &line[..at];
                    if !last.trim().is_empty() {
                        body.push(last);
                    }
                    blocks.push(CodeBlock {
                        language: if language.is_empty() {
                            DEFAULT_LANGUAGE.to_string()
                        } else {
                            language.to_string()
                        },
                        code: body.join("\n").trim().to_string(),
                    });
                    ScanState::Outside
                } else {
                    body.push(line);
                    ScanState::Inside { language, body }
                }
            }
        };
    }

    blocks
}

/// `Some(tag)` when `line` opens a fence; the tag is empty when absent.
fn opening_tag(line: &str) -> Option<&str> {
    let tag = line.strip_prefix(FENCE)?.trim();
    if tag.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '-' || c == '+') {
        Some(tag)
    } else {
        None
    }
}
