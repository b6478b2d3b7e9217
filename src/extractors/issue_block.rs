// src/extractors/issue_block.rs

use crate::extractors::fields::{description_anchor, is_label_line};
use crate::extractors::text::{clean_value, indent_width, is_bullet, line_start, lines_with_offsets, strip_bullet};
use serde::Serialize;

/// How a category body was divided into issue blocks, most structured first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SplitStrategy {
    /// At `**Issue description:**` style labels.
    EmphasizedLabel,
    /// At `Issue description:` labels without emphasis.
    PlainLabel,
    /// At the shallowest bulleted lines.
    Bullet,
}

impl SplitStrategy {
    pub const ORDER: [SplitStrategy; 3] =
        [SplitStrategy::EmphasizedLabel, SplitStrategy::PlainLabel, SplitStrategy::Bullet];

    /// Byte offsets where blocks begin, or empty if the strategy does not apply.
    fn split_points(self, body: &str, min_indent: usize) -> Vec<usize> {
        match self {
            SplitStrategy::EmphasizedLabel => label_split_points(body, true, min_indent),
            SplitStrategy::PlainLabel => label_split_points(body, false, min_indent),
            SplitStrategy::Bullet => bullet_split_points(body, min_indent),
        }
    }
}

fn label_split_points(body: &str, emphasized: bool, min_indent: usize) -> Vec<usize> {
    description_anchor(emphasized)
        .find_iter(body)
        .map(|m| line_start(body, m.start()))
        .filter(|start| {
            let line = &body[*start..];
            indent_width(line) >= min_indent
        })
        .collect()
}

fn bullet_split_points(body: &str, min_indent: usize) -> Vec<usize> {
    let bullets: Vec<(usize, usize)> = lines_with_offsets(body)
        .filter(|(_, line)| is_bullet(line))
        .map(|(offset, line)| (offset, indent_width(line)))
        .filter(|(_, indent)| *indent >= min_indent)
        .collect();

    // Nested field bullets stay with their parent: only the top bullet level splits.
    let Some(top) = bullets.iter().map(|(_, indent)| *indent).min() else {
        return Vec::new();
    };
    bullets
        .into_iter()
        .filter(|(_, indent)| *indent == top)
        .map(|(offset, _)| offset)
        .collect()
}

/// Divides a category body into issue blocks using the first strategy that finds any.
/// Text ahead of the first split point is not part of any block.
pub fn split_issue_blocks(body: &str, category_indent: usize) -> Option<(SplitStrategy, Vec<&str>)> {
    for strategy in SplitStrategy::ORDER {
        let points = strategy.split_points(body, category_indent);
        if points.is_empty() {
            continue;
        }
        let blocks: Vec<&str> = points
            .iter()
            .enumerate()
            .map(|(idx, start)| {
                let end = points.get(idx + 1).copied().unwrap_or(body.len());
                &body[*start..end]
            })
            .collect();
        tracing::debug!("Split category body into {} blocks via {:?}", blocks.len(), strategy);
        return Some((strategy, blocks));
    }
    None
}

/// The block's own first line, used as the description of an unlabeled bullet.
/// Returns `None` when that line is itself a field label.
pub fn bullet_headline(block: &str) -> Option<String> {
    let line = block.lines().find(|l| !l.trim().is_empty())?;
    if is_label_line(line) {
        return None;
    }
    let headline = clean_value(strip_bullet(line));
    if headline.is_empty() {
        None
    } else {
        Some(headline)
    }
}
