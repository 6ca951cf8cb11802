use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{
    Attribute, Cell, CellAlignment, Color, ColumnConstraint, ContentArrangement, Table, Width,
};
use tmm_cli::commands::MapReport;
use tmm_model::{MatchDecision, MatchStatus, MatchType};

pub fn print_summary(report: &MapReport) {
    if let Some(table) = &report.table {
        println!("Table: {table}");
    }
    println!(
        "Threshold: {:.2}  Max suggestions: {}  Fuzzy: {}",
        report.options.fuzzy_threshold,
        report.options.max_suggestions,
        if report.options.fuzzy_enabled { "on" } else { "off" }
    );

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Source"),
        header_cell("Target"),
        header_cell("Status"),
        header_cell("Type"),
        header_cell("Confidence"),
        header_cell("Rationale"),
    ]);
    apply_decision_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Center);
    align_column(&mut table, 4, CellAlignment::Right);
    for decision in &report.decisions {
        table.add_row(decision_row(decision));
    }
    println!("{table}");
    print_statistics(report);
}

fn print_statistics(report: &MapReport) {
    let stats = &report.statistics;
    let mut table = Table::new();
    table.set_header(vec![header_cell("Metric"), header_cell("Count")]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    table.add_row(vec![Cell::new("Sources"), Cell::new(stats.total_sources)]);
    table.add_row(vec![Cell::new("Targets"), Cell::new(stats.total_targets)]);
    for match_type in MatchType::ALL {
        let count = stats.count(match_type);
        table.add_row(vec![
            Cell::new(format!("  {match_type}")),
            count_cell(count, type_color(match_type)),
        ]);
    }
    table.add_row(vec![
        Cell::new("Audit matches"),
        count_cell(stats.audit_matches, Color::Yellow),
    ]);
    table.add_row(vec![
        Cell::new("Coverage")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(format!("{:.1}%", stats.coverage_percentage)).add_attribute(Attribute::Bold),
    ]);
    println!();
    println!("{table}");

    if !stats.unmapped_mandatory_targets.is_empty() {
        eprintln!("Unmapped mandatory targets:");
        for name in &stats.unmapped_mandatory_targets {
            eprintln!("- {name}");
        }
    }
}

pub fn print_synonyms(term: &str, synonyms: &[String]) {
    if synonyms.is_empty() {
        println!("No synonyms known for '{term}'");
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![header_cell(&format!("Synonyms of '{term}'"))]);
    apply_table_style(&mut table);
    for synonym in synonyms {
        table.add_row(vec![Cell::new(synonym)]);
    }
    println!("{table}");
}

fn decision_row(decision: &MatchDecision) -> Vec<Cell> {
    let target = match &decision.target_name {
        Some(name) => Cell::new(name),
        None => dim_cell("-"),
    };
    vec![
        Cell::new(&decision.source_name),
        target,
        status_cell(decision.status),
        Cell::new(decision.match_type).fg(type_color(decision.match_type)),
        confidence_cell(decision),
        Cell::new(&decision.rationale),
    ]
}

fn status_cell(status: MatchStatus) -> Cell {
    match status {
        MatchStatus::Mapped => Cell::new("mapped")
            .fg(Color::Green)
            .add_attribute(Attribute::Bold),
        MatchStatus::Skipped => Cell::new("skipped").fg(Color::Blue),
        MatchStatus::Unmapped => Cell::new("unmapped").fg(Color::Red),
        MatchStatus::AuditOnly => Cell::new("audit").fg(Color::Yellow),
    }
}

fn confidence_cell(decision: &MatchDecision) -> Cell {
    if decision.status == MatchStatus::Unmapped {
        return dim_cell("-");
    }
    Cell::new(format!("{:.2}", decision.confidence))
}

fn type_color(match_type: MatchType) -> Color {
    match match_type {
        MatchType::Exact | MatchType::CentralManual => Color::Green,
        MatchType::Synonym => Color::Cyan,
        MatchType::Fuzzy => Color::Yellow,
        MatchType::CentralSkip => Color::Blue,
        MatchType::None => Color::Red,
    }
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(80);
}

fn apply_decision_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(160);
    if table.column_count() >= 6 {
        table.set_constraints(vec![
            ColumnConstraint::UpperBoundary(Width::Percentage(20)),
            ColumnConstraint::UpperBoundary(Width::Percentage(20)),
            ColumnConstraint::LowerBoundary(Width::Fixed(10)),
            ColumnConstraint::LowerBoundary(Width::Fixed(16)),
            ColumnConstraint::LowerBoundary(Width::Fixed(12)),
            ColumnConstraint::UpperBoundary(Width::Percentage(45)),
        ]);
    }
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
