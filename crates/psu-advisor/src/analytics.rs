//! Analysis Toolkit
//!
//! The seven data-lookup operations the model may invoke. Each returns a
//! structured JSON payload; lookup misses (unknown PSU, unknown sector,
//! invalid metric) come back as `{"error": ...}` payloads rather than Rust
//! errors, so the model sees them as tool results and can adjust.

use serde_json::{json, Value};
use std::cmp::Ordering;
use std::sync::Arc;

use crate::dataset::{round2, round4, PsuDataset};
use crate::model::{Metric, PsuRecord};

/// Read-only analytics over a shared dataset
#[derive(Clone)]
pub struct AnalysisToolkit {
    dataset: Arc<PsuDataset>,
}

impl AnalysisToolkit {
    pub fn new(dataset: Arc<PsuDataset>) -> Self {
        Self { dataset }
    }

    pub fn dataset(&self) -> &PsuDataset {
        &self.dataset
    }

    /// High-level overview of the entire dataset
    pub fn dataset_overview(&self) -> Value {
        let latest_year = self.dataset.latest_year();
        let latest: Vec<&PsuRecord> = self
            .dataset
            .records()
            .iter()
            .filter(|r| r.year == latest_year)
            .collect();

        let total_revenue: f64 = latest.iter().map(|r| r.revenue).sum();
        let profitable = latest.iter().filter(|r| r.net_profit > 0.0).count();
        let loss_making = latest.iter().filter(|r| r.net_profit <= 0.0).count();

        json!({
            "psu_count": self.dataset.psu_names().len(),
            "sector_count": self.dataset.sectors().len(),
            "sectors": self.dataset.sectors(),
            "year_range": format!("{} to {}", self.dataset.min_year(), latest_year),
            "latest_year": latest_year,
            "total_revenue": total_revenue,
            "profitable_psus": profitable,
            "loss_making_psus": loss_making,
        })
    }

    /// All yearly records for one PSU, or every record for `"all"`/`None`
    pub fn psu_data(&self, psu_name: Option<&str>) -> Value {
        match psu_name {
            Some(name) if name != "all" => {
                if !self.dataset.has_psu(name) {
                    return json!({"error": format!("PSU '{name}' not found")});
                }
                records_json(&self.dataset.records_for_psu(name))
            }
            _ => records_json(&self.dataset.records().iter().collect::<Vec<_>>()),
        }
    }

    /// Latest-year record per PSU in a sector, or the sector list for
    /// `"all"`/`None`
    pub fn sector_data(&self, sector: Option<&str>) -> Value {
        match sector {
            Some(name) if name != "all" => {
                if !self.dataset.has_sector(name) {
                    return json!({"error": format!("Sector '{name}' not found")});
                }
                let records: Vec<&PsuRecord> = self
                    .dataset
                    .latest_records()
                    .into_iter()
                    .filter(|r| r.sector == name)
                    .collect();
                records_json(&records)
            }
            _ => json!({"sectors": self.dataset.sectors()}),
        }
    }

    /// Per-PSU performance analysis: yearly metric series plus multi-year
    /// trends
    pub fn analyze_psu(&self, psu_name: &str) -> Value {
        if !self.dataset.has_psu(psu_name) {
            return json!({"error": format!("PSU '{psu_name}' not found")});
        }

        let records = self.dataset.records_for_psu(psu_name);
        let first = records[0];
        let last = records[records.len() - 1];

        let yearly_metrics = json!({
            "years": records.iter().map(|r| r.year).collect::<Vec<_>>(),
            "revenue": records.iter().map(|r| r.revenue).collect::<Vec<_>>(),
            "net_profit": records.iter().map(|r| r.net_profit).collect::<Vec<_>>(),
            "profit_margin": records.iter().map(|r| r.profit_margin).collect::<Vec<_>>(),
            "debt_equity": records.iter().map(|r| r.debt_equity).collect::<Vec<_>>(),
            "roe": records.iter().map(|r| r.roe).collect::<Vec<_>>(),
        });

        let trends = if records.len() > 1 {
            let revenue_growth = (last.revenue / first.revenue - 1.0) * 100.0;
            let margin_change = last.profit_margin - first.profit_margin;
            let direction = if revenue_growth > 0.0 && margin_change > 0.0 {
                "improving"
            } else if (revenue_growth > 0.0) != (margin_change > 0.0) {
                "mixed"
            } else {
                "declining"
            };

            json!({
                "revenue_growth_percent": round2(revenue_growth),
                "profit_margin_change": round4(margin_change),
                "latest_year_profit": round2(last.net_profit),
                "trend_direction": direction,
            })
        } else {
            json!({})
        };

        json!({
            "psu_name": psu_name,
            "sector": first.sector,
            "size": first.size,
            "latest_year": last.year,
            "yearly_metrics": yearly_metrics,
            "trends": trends,
        })
    }

    /// Compare one PSU's latest metrics against its sector's latest-year
    /// averages and percentile rankings
    pub fn compare_with_sector(&self, psu_name: &str) -> Value {
        if !self.dataset.has_psu(psu_name) {
            return json!({"error": format!("PSU '{psu_name}' not found")});
        }

        let records = self.dataset.records_for_psu(psu_name);
        let psu_latest = records[records.len() - 1];
        let sector = &psu_latest.sector;

        let sector_latest: Vec<&PsuRecord> = self
            .dataset
            .latest_records()
            .into_iter()
            .filter(|r| &r.sector == sector)
            .collect();

        let averages = json!({
            "revenue": mean(&sector_latest, |r| r.revenue),
            "profit_margin": mean(&sector_latest, |r| r.profit_margin),
            "debt_equity": mean(&sector_latest, |r| r.debt_equity),
            "roe": mean(&sector_latest, |r| r.roe),
        });

        let percentiles = json!({
            "revenue": percentile_rank(&sector_latest, |r| r.revenue, psu_latest.revenue),
            "profit_margin": percentile_rank(&sector_latest, |r| r.profit_margin, psu_latest.profit_margin),
            "roe": percentile_rank(&sector_latest, |r| r.roe, psu_latest.roe),
        });

        json!({
            "psu_name": psu_name,
            "sector": sector,
            "psu_metrics": {
                "revenue": psu_latest.revenue,
                "profit_margin": psu_latest.profit_margin,
                "debt_equity": psu_latest.debt_equity,
                "roe": psu_latest.roe,
            },
            "sector_averages": averages,
            "percentile_rankings": percentiles,
        })
    }

    /// Rank PSUs by one metric over their latest-year records, with an
    /// optional sector filter
    pub fn identify_top_performers(
        &self,
        sector: Option<&str>,
        metric: &str,
        top_n: usize,
    ) -> Value {
        let Some(metric) = Metric::parse(metric) else {
            return json!({
                "error": format!(
                    "Invalid metric: {metric}. Valid options are: {}",
                    Metric::valid_options()
                )
            });
        };

        let mut filtered = self.dataset.latest_records();
        if let Some(name) = sector {
            if name != "all" {
                if !self.dataset.has_sector(name) {
                    return json!({"error": format!("Sector '{name}' not found")});
                }
                filtered.retain(|r| r.sector == name);
            }
        }

        let average = mean(&filtered, |r| metric.value(r));

        filtered.sort_by(|a, b| {
            let ordering = metric
                .value(a)
                .partial_cmp(&metric.value(b))
                .unwrap_or(Ordering::Equal);
            if metric.ranks_ascending() {
                ordering
            } else {
                ordering.reverse()
            }
        });

        let top: Vec<Value> = filtered
            .iter()
            .take(top_n)
            .map(|r| {
                json!({
                    "psu_name": r.psu_name,
                    "sector": r.sector,
                    "metric_value": metric.value(r),
                    "profit": r.net_profit,
                    "revenue": r.revenue,
                    "size": r.size,
                })
            })
            .collect();

        json!({
            "metric": metric.as_str(),
            "top_performers": top,
            "average_value": average,
        })
    }

    /// Sector-wide yearly aggregates plus best/worst performer by ROE
    pub fn analyze_sector(&self, sector: &str) -> Value {
        if !self.dataset.has_sector(sector) {
            return json!({"error": format!("Sector '{sector}' not found")});
        }

        let sector_records: Vec<&PsuRecord> = self
            .dataset
            .records()
            .iter()
            .filter(|r| r.sector == sector)
            .collect();

        let mut years: Vec<i32> = sector_records.iter().map(|r| r.year).collect();
        years.sort_unstable();
        years.dedup();
        years.reverse();

        let yearly_metrics: Vec<Value> = years
            .iter()
            .map(|&year| {
                let year_records: Vec<&PsuRecord> = sector_records
                    .iter()
                    .filter(|r| r.year == year)
                    .copied()
                    .collect();

                json!({
                    "year": year,
                    "total_revenue": year_records.iter().map(|r| r.revenue).sum::<f64>(),
                    "total_profit": year_records.iter().map(|r| r.net_profit).sum::<f64>(),
                    "avg_profit_margin": mean(&year_records, |r| r.profit_margin),
                    "avg_roe": mean(&year_records, |r| r.roe),
                    "avg_debt_equity": mean(&year_records, |r| r.debt_equity),
                    "profitable_psus": year_records.iter().filter(|r| r.net_profit > 0.0).count(),
                    "loss_making_psus": year_records.iter().filter(|r| r.net_profit <= 0.0).count(),
                })
            })
            .collect();

        let latest_year = years.first().copied().unwrap_or(0);
        let latest: Vec<&PsuRecord> = sector_records
            .iter()
            .filter(|r| r.year == latest_year)
            .copied()
            .collect();

        let best = extreme_by_roe(&latest, Ordering::Greater);
        let worst = extreme_by_roe(&latest, Ordering::Less);

        let psu_count = {
            let mut names: Vec<&str> = sector_records.iter().map(|r| r.psu_name.as_str()).collect();
            names.sort_unstable();
            names.dedup();
            names.len()
        };

        json!({
            "sector": sector,
            "psu_count": psu_count,
            "yearly_metrics": yearly_metrics,
            "latest_year": latest_year,
            "best_performer": best,
            "worst_performer": worst,
        })
    }
}

fn records_json(records: &[&PsuRecord]) -> Value {
    serde_json::to_value(records).unwrap_or_else(|_| json!([]))
}

fn mean(records: &[&PsuRecord], f: impl Fn(&PsuRecord) -> f64) -> f64 {
    if records.is_empty() {
        return 0.0;
    }
    records.iter().map(|r| f(r)).sum::<f64>() / records.len() as f64
}

/// Fraction of values strictly below `value`, as a percentage
fn percentile_rank(records: &[&PsuRecord], f: impl Fn(&PsuRecord) -> f64, value: f64) -> f64 {
    if records.is_empty() {
        return 0.0;
    }
    let below = records.iter().filter(|r| f(r) < value).count();
    below as f64 / records.len() as f64 * 100.0
}

fn extreme_by_roe(records: &[&PsuRecord], wanted: Ordering) -> String {
    records
        .iter()
        .reduce(|best, r| {
            if r.roe.partial_cmp(&best.roe).unwrap_or(Ordering::Equal) == wanted {
                r
            } else {
                best
            }
        })
        .map_or_else(|| "N/A".to_string(), |r| r.psu_name.clone())
}
