use financial_fact_resolver::*;

fn sample_workbook() -> InMemoryWorkbook {
    let mut status = CellGrid::default();
    status.set(0, 0, Cell::text("Acme Construction Ltd"));
    status.set(2, 0, Cell::text("Project Code:"));
    status.set(2, 1, Cell::text("P-1024"));
    status.set(4, 0, Cell::text("Report Date:"));
    status.set(4, 1, Cell::text("2024-06-30"));
    status.set(11, 2, Cell::text("Budget"));
    status.set(12, 2, Cell::text("Revision"));
    status.set(13, 2, Cell::text("C"));
    status.set(11, 3, Cell::text("Projection"));
    status.set(13, 3, Cell::text("D=B+C"));
    status.set(16, 0, Cell::Number(3.0));
    status.set(16, 1, Cell::text("Gross Profit"));
    status.set(16, 2, Cell::Number(1_850_000.0));
    status.set(16, 3, Cell::Number(2_120_500.0));

    let mut projection = CellGrid::default();
    for (col, month) in ["Apr", "May", "Jun"].iter().enumerate() {
        projection.set(10, 2 + col, Cell::text(*month));
    }
    projection.set(12, 0, Cell::text("2.1.3"));
    projection.set(12, 1, Cell::text("Site staff"));
    projection.set(13, 0, Cell::text("2.2.1"));
    projection.set(13, 1, Cell::text("Concrete"));
    for col in 0..3 {
        projection.set(12, 2 + col, Cell::Number(42_000.0 + col as f64 * 1_500.0));
        projection.set(13, 2 + col, Cell::Number(118_000.0 * (col + 1) as f64));
    }

    InMemoryWorkbook::new()
        .with_sheet("Financial Status", status)
        .with_sheet("Projection", projection)
}

#[cfg(feature = "xlsx")]
fn load(path: Option<String>) -> InMemoryWorkbook {
    match path {
        Some(path) => load_workbook(&path).unwrap(),
        None => sample_workbook(),
    }
}

#[cfg(not(feature = "xlsx"))]
fn load(path: Option<String>) -> InMemoryWorkbook {
    if path.is_some() {
        println!("⚠️  Built without the `xlsx` feature; using the sample workbook");
    }
    sample_workbook()
}

fn main() {
    println!("📊 Normalize a project report and ask it questions\n");

    let workbook = load(std::env::args().nth(1));
    let mut service =
        FactResolverService::new(NormalizerConfig::default(), ResolverConfig::default()).unwrap();
    let report = service.ingest("demo", &workbook);

    println!("📋 Ingestion:");
    println!("  Facts: {}", report.summary.rows);
    println!("  Sheets: {}", report.summary.sheets.join(", "));
    if let Some(period) = report.base_period {
        println!("  Report period: {}", period);
    }
    for warning in &report.warnings {
        println!("  ⚠️  {}", warning);
    }

    let prefs = PreferenceStore::in_memory();
    let scope = Scope::project("demo");
    let context = QueryContext::at(report.base_period);

    for query in ["What is the GP?", "What is the GP?", "monthly prelims", "concrete in May"] {
        println!("\n❓ {}", query);
        match service.query(&scope, query, &context, &prefs).unwrap() {
            QueryOutcome::Answer(answer) => println!("  ✓ {}", answer.text),
            QueryOutcome::Ambiguous(candidates) => {
                for (i, c) in candidates.iter().enumerate() {
                    println!(
                        "  {}. {} - {} [{}] score {}: {}",
                        i + 1,
                        c.financial_type,
                        c.data_type,
                        c.item_code,
                        c.score,
                        format_amount(c.value)
                    );
                }
                let answer = service
                    .resolve(&scope, query, &Selection::from(&candidates[0]), &prefs)
                    .unwrap();
                println!("  → picked #1, remembered: {}", answer.text);
            }
            QueryOutcome::Breakdown(breakdown) => {
                println!(
                    "  {} ({}) for {}:",
                    breakdown.category, breakdown.item_code_prefix, breakdown.period
                );
                for (classification, subtotal) in &breakdown.subtotals {
                    println!("    {}: {}", classification, format_amount(*subtotal));
                }
            }
            QueryOutcome::NoMatch { .. } => println!("  No matching line items"),
            QueryOutcome::NoData { .. } => println!("  No data for this project"),
        }
    }

    println!("\n📄 Flat export:");
    let table = service.table("demo").unwrap();
    write_flat_csv(&table, std::io::stdout()).unwrap();
}
