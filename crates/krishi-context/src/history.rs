// SPDX-FileCopyrightText: 2026 Krishi Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use krishi_memory::MemoryContext;

/// Renders memory as prompt text.
///
/// One `ROLE: content` line per transcript message, then any retrieved
/// turns under a "Relevant earlier conversation" heading.
pub fn format_history(ctx: &MemoryContext) -> String {
    let mut lines: Vec<String> = ctx
        .messages
        .iter()
        .map(|m| format!("{}: {}", m.role.label(), m.content))
        .collect();

    if !ctx.relevant.is_empty() {
        if !lines.is_empty() {
            lines.push(String::new());
        }
        lines.push("Relevant earlier conversation:".to_string());
        for turn in &ctx.relevant {
            lines.push(format!("input: {}", turn.input));
            lines.push(format!("output: {}", turn.output));
        }
    }

    lines.join("\n")
}
