//! SVG flamegraph generation for the runtime context hierarchy.
//!
//! Draws collapsed context stacks as an inverted flamegraph (root at the
//! bottom). Frame colors are derived from the frame name so the same
//! function keeps its color across renders.

use crate::aggregator::stack_builder::CollapsedStack;
use crate::utils::config::{DEFAULT_FLAMEGRAPH_TITLE, DEFAULT_FLAMEGRAPH_WIDTH};
use crate::utils::error::FlamegraphError;
use colored::Colorize;
use log::info;
use std::collections::HashMap;

const FRAME_HEIGHT: usize = 20;
const TITLE_MARGIN: usize = 30;
const FOOTER_HEIGHT: usize = 50;
const CHAR_WIDTH: f64 = 7.0;

/// Flamegraph configuration
#[derive(Debug, Clone, PartialEq)]
pub struct FlamegraphConfig {
    pub title: String,
    pub width: usize,
}

impl Default for FlamegraphConfig {
    fn default() -> Self {
        Self {
            title: DEFAULT_FLAMEGRAPH_TITLE.to_string(),
            width: DEFAULT_FLAMEGRAPH_WIDTH,
        }
    }
}

impl FlamegraphConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_width(mut self, width: usize) -> Self {
        self.width = width;
        self
    }
}

/// Internal Node structure for building the tree
struct Node {
    name: String,
    value: u64,
    children: HashMap<String, Node>,
}

impl Node {
    fn new(name: String) -> Self {
        Self {
            name,
            value: 0,
            children: HashMap::new(),
        }
    }

    fn insert(&mut self, stack: &[&str], value: u64) {
        self.value += value;
        if let Some((head, tail)) = stack.split_first() {
            let child = self
                .children
                .entry(head.to_string())
                .or_insert_with(|| Node::new(head.to_string()));
            child.insert(tail, value);
        }
    }

    /// Children heaviest first, ties by name
    fn sorted_children(&self) -> Vec<&Node> {
        let mut children: Vec<&Node> = self.children.values().collect();
        children.sort_by(|a, b| b.value.cmp(&a.value).then_with(|| a.name.cmp(&b.name)));
        children
    }
}

/// Generate SVG flamegraph from collapsed stacks
///
/// **Public** - main entry point for flamegraph rendering
///
/// # Errors
/// * `FlamegraphError::EmptyStacks` - Nothing to draw
pub fn generate_flamegraph(
    stacks: &[CollapsedStack],
    config: Option<&FlamegraphConfig>,
) -> Result<String, FlamegraphError> {
    if stacks.is_empty() {
        return Err(FlamegraphError::EmptyStacks);
    }

    let config = config.cloned().unwrap_or_default();
    info!("Generating flamegraph with {} stacks", stacks.len());

    // 1. Build Tree
    let mut root = Node::new("all".to_string());
    for stack in stacks {
        let stack_parts: Vec<&str> = stack.stack.split(';').collect();
        root.insert(&stack_parts, stack.weight);
    }

    if root.value == 0 {
        return Err(FlamegraphError::EmptyStacks);
    }

    // 2. Render SVG
    let max_depth = calculate_max_depth(&root);
    let width = config.width;
    let graph_height = (max_depth + 1) * FRAME_HEIGHT;
    let total_height = graph_height + TITLE_MARGIN + FOOTER_HEIGHT;

    let mut svg_content = String::new();
    svg_content.push_str(&format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="0 0 {} {}">"#,
        width, total_height, width, total_height
    ));
    svg_content.push_str(
        r#"<style>.frame { font: 12px sans-serif; } .frame:hover { stroke: black; stroke-width: 1; cursor: pointer; opacity: 0.9; }</style>"#,
    );
    svg_content.push_str(&format!(
        r#"<text x="{}" y="20" font-size="16" text-anchor="middle" font-weight="bold">{}</text>"#,
        width / 2,
        escape_xml(&config.title)
    ));

    // Inverted: root at bottom
    render_node(&root, 0, 0.0, width as f64, root.value, &mut svg_content, graph_height);
    render_footer(&mut svg_content, graph_height, root.value, stacks.len());

    svg_content.push_str("</svg>");

    info!("Flamegraph generated successfully ({} bytes)", svg_content.len());
    Ok(svg_content)
}

fn calculate_max_depth(node: &Node) -> usize {
    node.children
        .values()
        .map(|child| calculate_max_depth(child) + 1)
        .max()
        .unwrap_or(0)
}

/// Warm palette color keyed by a stable hash of the frame name
fn frame_color(name: &str) -> String {
    if name == "all" {
        return "rgb(100, 149, 237)".to_string();
    }

    // FNV-1a
    let hash = name.bytes().fold(0x811c_9dc5u32, |acc, b| {
        (acc ^ u32::from(b)).wrapping_mul(0x0100_0193)
    });

    let r = 205 + (hash % 50);
    let g = (hash >> 8) % 230;
    let b = (hash >> 16) % 55;
    format!("rgb({}, {}, {})", r, g, b)
}

fn render_node(
    node: &Node,
    level: usize,
    x: f64,
    w: f64,
    total: u64,
    out: &mut String,
    graph_height: usize,
) {
    // Too narrow to see
    if w < 0.5 {
        return;
    }

    let y = graph_height - ((level + 1) * FRAME_HEIGHT) + TITLE_MARGIN;
    let name = escape_xml(&node.name);
    let percentage = node.value as f64 / total as f64 * 100.0;

    out.push_str(&format!(
        r#"<rect x="{:.2}" y="{}" width="{:.2}" height="{}" fill="{}" class="frame"><title>{} ({} traces, {:.2}%)</title></rect>"#,
        x,
        y,
        w,
        FRAME_HEIGHT,
        frame_color(&node.name),
        name,
        node.value,
        percentage
    ));

    if w > 35.0 {
        let max_chars = (w / CHAR_WIDTH) as usize;
        let label = truncate_label(&node.name, max_chars);
        if !label.is_empty() {
            out.push_str(&format!(
                r#"<text x="{:.2}" y="{}" dx="4" dy="14" font-size="12" fill="black" pointer-events="none">{}</text>"#,
                x,
                y,
                escape_xml(&label)
            ));
        }
    }

    let mut current_x = x;
    for child in node.sorted_children() {
        let child_w = (child.value as f64 / node.value as f64) * w;
        render_node(child, level + 1, current_x, child_w, total, out, graph_height);
        current_x += child_w;
    }
}

fn render_footer(out: &mut String, graph_height: usize, total: u64, stack_count: usize) {
    out.push_str(&format!(
        r#"<text x="10" y="{}" font-size="12">{} traces across {} context paths</text>"#,
        graph_height + TITLE_MARGIN + 30,
        total,
        stack_count
    ));
}

/// Cut a label to `max_chars` characters, marking the cut with "..."
fn truncate_label(name: &str, max_chars: usize) -> String {
    let len = name.chars().count();
    if len <= max_chars {
        return name.to_string();
    }
    if max_chars <= 3 {
        return String::new();
    }
    let kept: String = name.chars().take(max_chars - 3).collect();
    format!("{}...", kept)
}

/// Truncate from the left, keeping the innermost frames visible
fn truncate_stack(stack: &str, max_chars: usize) -> String {
    let len = stack.chars().count();
    if len <= max_chars {
        return stack.to_string();
    }
    let kept: String = stack.chars().skip(len - max_chars.saturating_sub(3)).collect();
    format!("...{}", kept)
}

fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Create a text table of the heaviest context stacks
///
/// **Public** - printed by `analyze --summary`
///
/// # Arguments
/// * `stacks` - Collapsed stacks, heaviest first
/// * `max_lines` - Number of stacks to list
/// * `total_traces` - Denominator for percentages
pub fn generate_text_summary(stacks: &[CollapsedStack], max_lines: usize, total_traces: u64) -> String {
    let mut lines = Vec::new();
    let total = total_traces.max(1);

    lines.push(format!("  {}", "HOT CONTEXTS".bold()));
    lines.push(format!("  ┏{}┳{}┳{}┓", "━".repeat(52), "━".repeat(12), "━".repeat(9)));
    lines.push(format!(
        "  ┃ {:<50} ┃ {:^10} ┃ {:^7} ┃",
        "Context Path (Hottest First)", "TRACES", "%"
    ));
    lines.push(format!("  ┣{}╋{}╋{}┫", "━".repeat(52), "━".repeat(12), "━".repeat(9)));

    for stack in stacks.iter().take(max_lines) {
        let percentage = (stack.weight as f64 / total as f64) * 100.0;
        let display_stack = format!("{:<50}", truncate_stack(&stack.stack, 50));

        lines.push(format!(
            "  ┃ {} ┃ {:>10} ┃ {:>6.1}% ┃",
            display_stack.yellow(),
            stack.weight,
            percentage
        ));
    }

    lines.push(format!("  ┗{}┻{}┻{}┛", "━".repeat(52), "━".repeat(12), "━".repeat(9)));

    lines.push(String::new());
    lines.push(format!("  {}", "CONTEXT BARS".bold()));
    for stack in stacks.iter().take(5) {
        let percentage = (stack.weight as f64 / total as f64) * 100.0;
        let bar = "█".repeat((percentage / 2.0) as usize);
        lines.push(format!(
            "  └─ {:<24} {:<50} {:>5.1}%",
            truncate_label(stack.leaf(), 24).cyan(),
            bar.red(),
            percentage
        ));
    }

    if stacks.len() > max_lines {
        lines.push(String::new());
        lines.push(format!(
            "   (Showing top {} of {} unique context paths)",
            max_lines,
            stacks.len()
        ));
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stacks() -> Vec<CollapsedStack> {
        vec![
            CollapsedStack::new("main;foo".to_string(), 6, Some(2)),
            CollapsedStack::new("main".to_string(), 3, Some(1)),
            CollapsedStack::new("main;a<b>".to_string(), 1, Some(3)),
        ]
    }

    #[test]
    fn test_generate_flamegraph() {
        let config = FlamegraphConfig::new().with_title("Run 1").with_width(800);
        let svg = generate_flamegraph(&stacks(), Some(&config)).unwrap();

        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert!(svg.contains(r#"width="800""#));
        assert!(svg.contains("Run 1"));
        assert!(svg.contains("foo (6 traces, 60.00%)"));
        assert!(svg.contains("a&lt;b&gt;"));
        assert!(!svg.contains("a<b>"));
    }

    #[test]
    fn test_empty_stacks_rejected() {
        assert!(matches!(
            generate_flamegraph(&[], None),
            Err(FlamegraphError::EmptyStacks)
        ));
    }

    #[test]
    fn test_max_depth() {
        let mut root = Node::new("all".to_string());
        root.insert(&["main", "foo", "bar"], 1);
        root.insert(&["main"], 1);
        assert_eq!(calculate_max_depth(&root), 3);
        assert_eq!(root.value, 2);
    }

    #[test]
    fn test_frame_color_is_stable() {
        assert_eq!(frame_color("parse"), frame_color("parse"));
    }

    #[test]
    fn test_truncation_respects_char_boundaries() {
        assert_eq!(truncate_label("äöüäöüäöü", 6), "äöü...");
        assert_eq!(truncate_stack("main;ääää;bar", 8), "...ä;bar");
    }

    #[test]
    fn test_text_summary_lists_stacks() {
        colored::control::set_override(false);
        let summary = generate_text_summary(&stacks(), 2, 10);
        assert!(summary.contains("main;foo"));
        assert!(summary.contains("60.0%"));
        assert!(summary.contains("Showing top 2 of 3"));
    }
}
