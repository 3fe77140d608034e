use analysis_core::MacroMetrics;
use serde::Serialize;

/// Reader-facing explanation of one macro input
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorNote {
    pub name: &'static str,
    pub value: f64,
    pub impact: &'static str,
    pub threshold: &'static str,
}

pub fn indicator_notes(metrics: &MacroMetrics) -> Vec<IndicatorNote> {
    vec![
        IndicatorNote {
            name: "Federal Funds Rate",
            value: metrics.federal_funds_rate,
            impact: "Higher rates typically indicate tighter monetary policy, which can slow economic growth but help control inflation.",
            threshold: "Current target range is typically between 0-5%",
        },
        IndicatorNote {
            name: "CPI (Inflation)",
            value: metrics.cpi_yoy,
            impact: "High inflation can erode purchasing power and lead to tighter monetary policy.",
            threshold: "Fed's target is around 2%",
        },
        IndicatorNote {
            name: "GDP Growth",
            value: metrics.gdp_growth,
            impact: "Indicates overall economic health and expansion/contraction.",
            threshold: "Healthy growth is typically 2-3%",
        },
        IndicatorNote {
            name: "Manufacturing PMI",
            value: metrics.manufacturing_pmi,
            impact: "Above 50 indicates expansion, below 50 indicates contraction.",
            threshold: "50 is the neutral point",
        },
    ]
}
