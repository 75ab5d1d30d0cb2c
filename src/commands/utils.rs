use crate::utils::config::REPORT_SCHEMA_VERSION;

/// Display schema information
pub fn display_schema(show_details: bool) {
    println!("trace-lens Analysis Report Schema");
    println!("Current Version: {}", REPORT_SCHEMA_VERSION);
    println!();

    if show_details {
        println!("Schema Structure:");
        println!("  version: string            - Schema version (e.g., '1.0.0')");
        println!("  source_file: string        - Trace export the report was built from");
        println!("  generated_at: string       - RFC 3339 timestamp");
        println!("  counts: object             - Row counts per collection");
        println!("    static_contexts: number");
        println!("    static_traces: number");
        println!("    contexts: number");
        println!("    traces: number");
        println!("  call_ids: array<number>    - Distinct call-site ids, ascending");
        println!("  call_trees: array?         - One entry per call id");
        println!("    call_id: number");
        println!("    callers: array<string>   - displayName of each calling trace point");
        println!("    result_static_trace_id: number");
        println!("    result_display_name: string");
        println!("  contexts: array            - Traces per execution context");
        println!("    context_id: number");
        println!("    display_name: string");
        println!("    trace_count: number");
        println!("    started_at: string?      - First trace timestamp");
        println!("    duration_ms: number?     - First to last trace");
        println!("  hot_contexts: array        - Context paths with the most traces");
        println!("    stack: string            - Context names, root first, ';'-separated");
        println!("    traces: number");
        println!("    percentage: number       - Share of all traces");
        println!("    context_id: number?");
    } else {
        println!("Use --show for detailed schema information");
    }
}

/// Display version information
pub fn display_version() {
    println!("trace-lens v{}", env!("CARGO_PKG_VERSION"));
    println!("Report Schema: v{}", REPORT_SCHEMA_VERSION);
    println!();
    println!("Reconstructs call sites and context hierarchies from recorded execution traces.");
}
