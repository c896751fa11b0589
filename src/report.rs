//! Operator-facing text rendering of closure results

use crate::types::{ClosurePlan, FieldFilter, SearchOutcome, SearchStatus};

/// Context printed above every result.
#[derive(Debug, Clone, Copy)]
pub struct ReportHeader<'a> {
    pub field: &'a FieldFilter,
    pub target_flow_m3_d: f64,
    pub horizon_days: u32,
}

impl ReportHeader<'_> {
    fn lines(&self) -> Vec<String> {
        vec![
            format!("Field:            {}", self.field),
            format!("Shutdown days:    {}", self.horizon_days),
            format!("Target flow:      {}", format_flow(self.target_flow_m3_d)),
        ]
    }
}

/// Render a successful plan.
pub fn render_plan(header: &ReportHeader<'_>, plan: &ClosurePlan) -> String {
    let mut lines = vec!["Optimization complete".to_string(), String::new()];
    lines.extend(header.lines());
    lines.push(format!("Wells to close:   {}", plan.wells.join(", ")));
    lines.push(format!("Closed flow:      {}", format_flow(plan.closed_flow_m3_d)));
    lines.push(format!("Daily impact:     {}/d", format_usd(plan.daily_profit_usd)));
    lines.push(format!("Total loss:       {}", format_usd(plan.profit_impact_usd)));
    lines.join("\n")
}

/// Render the "nothing reaches the target" message.
pub fn render_no_plan(header: &ReportHeader<'_>) -> String {
    let mut lines = vec![
        "No combination of wells reaches the target flow with the given parameters."
            .to_string(),
        String::new(),
    ];
    lines.extend(header.lines());
    lines.join("\n")
}

/// Render a monitored search result, flagging aborted and approximated runs.
pub fn render_outcome(header: &ReportHeader<'_>, outcome: &SearchOutcome) -> String {
    let mut text = match &outcome.plan {
        Some(plan) => render_plan(header, plan),
        None => render_no_plan(header),
    };

    if let SearchStatus::Aborted(reason) = &outcome.status {
        text.push_str(&format!(
            "\n\nSearch stopped early ({reason}) after {} of {} combinations; \
             the result above is the best found so far and may not be minimal.",
            outcome.statistics.subsets_evaluated, outcome.statistics.subsets_total
        ));
    }
    if outcome.statistics.approximation_applied {
        text.push_str(&format!(
            "\n\nApproximate result: searched the {} highest-flow wells in combinations \
             of up to {}; a cheaper combination may exist.",
            outcome.statistics.candidates, outcome.statistics.max_subset_size
        ));
    }
    text
}

/// `1234.5` → `1,234.50 m³/d`
pub fn format_flow(flow_m3_d: f64) -> String {
    format!("{} m³/d", group_thousands(&format!("{:.2}", flow_m3_d)))
}

/// `12345.678` → `$12,345.68`, `-5.0` → `-$5.00`
pub fn format_usd(amount: f64) -> String {
    let digits = format!("{:.2}", amount.abs());
    // Values that round to zero never carry a sign
    let negative = amount < 0.0 && digits.bytes().any(|b| b.is_ascii_digit() && b != b'0');
    let sign = if negative { "-" } else { "" };
    format!("{sign}${}", group_thousands(&digits))
}

fn group_thousands(number: &str) -> String {
    let (sign, unsigned) = match number.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", number),
    };
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (unsigned, None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    match frac_part {
        Some(f) => format!("{sign}{grouped}.{f}"),
        None => format!("{sign}{grouped}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ApproximationPolicy, SearchStatistics};

    fn plan() -> ClosurePlan {
        ClosurePlan {
            wells: vec!["B".into(), "C".into()],
            closed_flow_m3_d: 80.0,
            daily_profit_usd: 90.0,
            profit_impact_usd: 180.0,
            horizon_days: 2,
        }
    }

    #[test]
    fn currency_groups_and_signs() {
        assert_eq!(format_usd(12345.678), "$12,345.68");
        assert_eq!(format_usd(999.0), "$999.00");
        assert_eq!(format_usd(1_000_000.0), "$1,000,000.00");
        assert_eq!(format_usd(-1234.5), "-$1,234.50");
        assert_eq!(format_usd(-0.001), "$0.00");
        assert_eq!(format_usd(0.0), "$0.00");
    }

    #[test]
    fn flow_uses_two_decimals() {
        assert_eq!(format_flow(80.0), "80.00 m³/d");
        assert_eq!(format_flow(1234.567), "1,234.57 m³/d");
    }

    #[test]
    fn plan_lists_wells_flow_and_loss() {
        let field = FieldFilter::Only("Pilar".into());
        let header = ReportHeader {
            field: &field,
            target_flow_m3_d: 70.0,
            horizon_days: 2,
        };
        let text = render_plan(&header, &plan());
        assert!(text.contains("Field:            Pilar"));
        assert!(text.contains("Wells to close:   B, C"));
        assert!(text.contains("Closed flow:      80.00 m³/d"));
        assert!(text.contains("Total loss:       $180.00"));
    }

    #[test]
    fn no_plan_message() {
        let header = ReportHeader {
            field: &FieldFilter::Any,
            target_flow_m3_d: 500.0,
            horizon_days: 5,
        };
        let text = render_no_plan(&header);
        assert!(text.starts_with("No combination of wells reaches the target flow"));
        assert!(text.contains("500.00 m³/d"));
    }

    #[test]
    fn outcome_flags_abort_and_approximation() {
        let header = ReportHeader {
            field: &FieldFilter::Any,
            target_flow_m3_d: 70.0,
            horizon_days: 2,
        };
        let outcome = SearchOutcome {
            plan: Some(plan()),
            status: SearchStatus::Aborted("time limit reached".into()),
            approximation: Some(ApproximationPolicy::default()),
            statistics: SearchStatistics {
                approximation_applied: true,
                candidates: 30,
                max_subset_size: 6,
                subsets_total: 100,
                subsets_evaluated: 40,
                ..Default::default()
            },
        };
        let text = render_outcome(&header, &outcome);
        assert!(text.contains("Search stopped early (time limit reached) after 40 of 100"));
        assert!(text.contains("30 highest-flow wells"));
    }
}
