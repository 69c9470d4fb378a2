//! Report payloads built from the aggregates.
//!
//! [`Summary`] backs the dashboard and the statistics endpoint;
//! [`DataFeed`] is the JSON feed of recent records and daily counts.

use crate::store::{DATE_FORMAT, TIME_FORMAT};
use crate::{stats, Result, VisitRecord};
use chrono::NaiveDate;
use serde::Serialize;

/// Counter plus label, as rendered by the dashboard and the JSON summary
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Bucket {
    pub label: String,
    pub count: usize,
}

impl Bucket {
    fn new(label: impl ToString, count: usize) -> Self {
        Self {
            label: label.to_string(),
            count,
        }
    }
}

/// Dashboard statistics over the whole visitor log
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Summary {
    pub total_count: usize,
    pub count_today: usize,
    pub present_count: usize,
    pub by_day: Vec<Bucket>,
    pub by_destination: Vec<Bucket>,
    pub top_companies: Vec<Bucket>,
    pub by_hour: Vec<Bucket>,
}

impl Summary {
    pub fn from_records(records: &[VisitRecord], today: NaiveDate, top_n: usize) -> Self {
        Self {
            total_count: stats::total_count(records),
            count_today: stats::count_today(records, today),
            present_count: stats::present_count(records),
            by_day: stats::counts_by_day(records)
                .into_iter()
                .map(|(day, count)| Bucket::new(day.format("%Y-%m-%d"), count))
                .collect(),
            by_destination: stats::counts_by_destination(records)
                .into_iter()
                .map(|(destination, count)| Bucket::new(destination, count))
                .collect(),
            top_companies: stats::top_companies(records, top_n)
                .into_iter()
                .map(|(company, count)| Bucket::new(company, count))
                .collect(),
            by_hour: stats::counts_by_hour(records)
                .into_iter()
                .map(|(hour, count)| Bucket::new(format!("{:02}h", hour), count))
                .collect(),
        }
    }

    /// Zeroed statistics shown when the log cannot be read
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.total_count == 0
    }
}

/// Daily entry counts as parallel arrays for chart libraries
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ChartSeries {
    pub labels: Vec<String>,
    pub values: Vec<usize>,
}

/// One record of the data feed, keyed like the CSV columns
///
/// Unlike the file row the id stays numeric.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FeedRow {
    pub id: u64,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "cpf")]
    pub personal_id: String,
    #[serde(rename = "empresa")]
    pub company: String,
    #[serde(rename = "destino")]
    pub destination: String,
    pub data_entrada: String,
    pub hora_entrada: String,
    pub data_saida: Option<String>,
    pub hora_saida: Option<String>,
}

impl From<&VisitRecord> for FeedRow {
    fn from(record: &VisitRecord) -> Self {
        Self {
            id: record.id,
            name: record.name.clone(),
            personal_id: record.personal_id.clone(),
            company: record.company.clone(),
            destination: record.destination.clone(),
            data_entrada: record.entry_date.format(DATE_FORMAT).to_string(),
            hora_entrada: record.entry_time.format(TIME_FORMAT).to_string(),
            data_saida: record.exit_date.map(|d| d.format(DATE_FORMAT).to_string()),
            hora_saida: record.exit_time.map(|t| t.format(TIME_FORMAT).to_string()),
        }
    }
}

/// Recent records and the per-day chart series
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DataFeed {
    pub latest_records: Vec<FeedRow>,
    pub chart: ChartSeries,
}

impl DataFeed {
    pub fn from_records(records: &[VisitRecord], latest_n: usize) -> Self {
        let (labels, values) = stats::counts_by_day(records)
            .into_iter()
            .map(|(day, count)| (day.format("%Y-%m-%d").to_string(), count))
            .unzip();

        Self {
            latest_records: stats::latest(records, latest_n)
                .iter()
                .map(FeedRow::from)
                .collect(),
            chart: ChartSeries { labels, values },
        }
    }
}

/// Render a feed result as JSON, turning failures into `{"error": ...}`
pub fn feed_json(feed: Result<DataFeed>) -> serde_json::Value {
    match feed.and_then(|f| serde_json::to_value(f).map_err(crate::Error::from)) {
        Ok(value) => value,
        Err(e) => serde_json::json!({ "error": e.to_string() }),
    }
}
