//! Printable reports for each view

use std::fmt::Write;

use serde::Serialize;

use gb_core::{BrowseSession, FacetOptions, GrantId, GrantRecord};
use gb_views::{
    format_money, overview_stats, projects_label, stats_by_region, stats_by_year, status_label,
    table_rows, Cluster, MapBounds, MapView, OverviewStats, RegionStats, TableRow, TableView,
    YearStats,
};

#[derive(Debug, Serialize)]
pub struct TableReport {
    pub source: String,
    pub total_records: usize,
    pub total_matches: usize,
    pub page: usize,
    pub total_pages: usize,
    pub rows: Vec<TableRow>,
}

impl TableReport {
    pub fn from_session(session: &BrowseSession) -> Self {
        let context = session.get_context();
        Self {
            source: session.source_name(),
            total_records: context.total_records,
            total_matches: context.total_matches,
            page: context.page.number(),
            total_pages: context.total_pages,
            rows: table_rows(&session.current_page(), context.page),
        }
    }

    pub fn to_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "{}: найдено {} из {}",
            self.source,
            projects_label(self.total_matches),
            self.total_records
        );
        if self.rows.is_empty() {
            out.push_str("Проекты не найдены\n");
        } else {
            out.push_str(&TableView::default().render(&self.rows));
        }
        let _ = writeln!(out, "Страница {} из {}", self.page, self.total_pages);
        out
    }
}

#[derive(Debug, Serialize)]
pub struct MapReport {
    pub bounds: MapBounds,
    pub clusters: Vec<Cluster>,
}

impl MapReport {
    pub fn from_session(session: &BrowseSession, map: &MapView) -> Self {
        let clusters = map.clusters(session);
        Self {
            bounds: MapBounds::around(&clusters),
            clusters: clusters.as_ref().clone(),
        }
    }

    pub fn to_text(&self) -> String {
        let mut out = String::new();
        let b = &self.bounds;
        let _ = writeln!(
            out,
            "Границы: {:.4}..{:.4} с.ш., {:.4}..{:.4} в.д.",
            b.south, b.north, b.west, b.east
        );

        for cluster in &self.clusters {
            let marker = if cluster.has_winner { "*" } else { "-" };
            let _ = writeln!(
                out,
                "{} {} [{}] {}, запрошено {}",
                marker,
                cluster.label,
                cluster.display,
                projects_label(cluster.count),
                format_money(cluster.total_requested)
            );
            for entry in &cluster.preview {
                let _ = writeln!(
                    out,
                    "    {} ({}) {}{}",
                    entry.name,
                    entry.organization,
                    entry.amount,
                    if entry.winner { ", победитель" } else { "" }
                );
            }
            if cluster.remaining > 0 {
                let _ = writeln!(out, "    ... и ещё {}", projects_label(cluster.remaining));
            }
        }
        out
    }
}

/// One project with its long-form fields
#[derive(Debug, Serialize)]
pub struct DetailReport {
    pub record: GrantRecord,
    pub status: &'static str,
    pub amount: String,
}

impl DetailReport {
    /// Look the id up in the loaded records, ignoring the current filters
    pub fn find(session: &BrowseSession, id: &GrantId) -> Option<Self> {
        session.record(id).map(|record| Self {
            status: status_label(record.winner),
            amount: format_money(record.requested_grant_amount),
            record,
        })
    }

    pub fn to_text(&self) -> String {
        let r = &self.record;
        let mut out = String::new();
        let _ = writeln!(out, "#{} {}", r.id, r.name().unwrap_or("Без названия"));

        let mut line = |label: &str, value: Option<&str>| {
            if let Some(value) = value.filter(|v| !v.is_empty()) {
                let _ = writeln!(out, "{}: {}", label, value);
            }
        };
        line("Регион", r.region());
        line("Организация", r.organization());
        line("Направление", r.direction());
        line("Конкурс", r.contest.as_deref());
        line("Год", r.year.map(|y| y.to_string()).as_deref());
        line("Статус", Some(self.status));
        line("Запрошено", Some(self.amount.as_str()));
        line("Описание", r.description.as_deref());
        line("Цель", r.goal.as_deref());
        line("Задачи", r.tasks.as_deref());
        line("Адрес", r.address.as_deref());
        line("Сайт", r.website.as_deref());
        line("Ссылка", r.link.as_deref());
        out
    }
}

pub fn facets_text(facets: &FacetOptions) -> String {
    let years: Vec<String> = facets.years.iter().map(|y| y.to_string()).collect();
    let mut out = String::new();
    let _ = writeln!(out, "Направления: {}", facets.directions.join(", "));
    let _ = writeln!(out, "Годы: {}", years.join(", "));
    let _ = writeln!(out, "Регионы: {}", facets.regions.join(", "));
    out
}

#[derive(Debug, Serialize)]
pub struct StatsReport {
    pub overview: OverviewStats,
    pub by_region: Vec<RegionStats>,
    pub by_year: Vec<YearStats>,
}

impl StatsReport {
    /// Statistics over the filtered set
    pub fn from_session(session: &BrowseSession) -> Self {
        let filtered = session.filtered();
        Self {
            overview: overview_stats(&filtered),
            by_region: stats_by_region(&filtered),
            by_year: stats_by_year(&filtered),
        }
    }

    pub fn to_text(&self) -> String {
        let o = &self.overview;
        let mut out = String::new();
        let _ = writeln!(out, "Всего проектов: {}", o.total_projects);
        let _ = writeln!(out, "Победителей: {}", o.total_winners);
        let _ = writeln!(out, "Сумма грантов победителей: {}", format_money(o.winners_requested));
        let _ = writeln!(out, "Регионов: {}", o.regions);
        let _ = writeln!(out, "Организаций: {}", o.organizations);

        out.push_str("\nПо регионам:\n");
        for row in &self.by_region {
            let _ = writeln!(
                out,
                "  {}: {}, победителей {}, {}",
                row.region,
                projects_label(row.stats.projects),
                row.stats.winners,
                format_money(row.stats.winners_requested)
            );
        }

        out.push_str("\nПо годам:\n");
        for row in &self.by_year {
            let year = row.year.map_or_else(|| "без года".to_string(), |y| y.to_string());
            let _ = writeln!(
                out,
                "  {}: {}, победителей {}, {}",
                year,
                projects_label(row.stats.projects),
                row.stats.winners,
                format_money(row.stats.winners_requested)
            );
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gb_core::{FilterCriteria, GrantRecord};
    use gb_views::{ClusterBuilder, GazetteerResolver};
    use std::sync::Arc;

    fn session() -> BrowseSession {
        let session = BrowseSession::new(2);
        session.load(
            "grants.json",
            vec![
                GrantRecord::new(1)
                    .with_name("Чистый город")
                    .with_region("Казань")
                    .with_direction("Экология")
                    .with_year(2023)
                    .with_winner(true)
                    .with_amount(300_000),
                GrantRecord::new(2)
                    .with_name("Школа волонтёров")
                    .with_region("Казань")
                    .with_year(2022),
                GrantRecord::new(3)
                    .with_name("Музей")
                    .with_region("Пермь")
                    .with_goal("Сохранить коллекцию")
                    .with_website("https://museum.example"),
            ],
        );
        session
    }

    #[test]
    fn test_table_report_pages() {
        let session = session();
        session.set_page(2);
        let report = TableReport::from_session(&session);

        assert_eq!(report.total_pages, 2);
        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.rows[0].number, 3);
        assert!(report.to_text().contains("Страница 2 из 2"));
    }

    #[test]
    fn test_table_report_empty_result() {
        let session = session();
        session.set_criteria(FilterCriteria::new().with_query("нет такого"));
        let text = TableReport::from_session(&session).to_text();
        assert!(text.contains("Проекты не найдены"));
        assert!(text.contains("Страница 1 из 1"));
    }

    #[test]
    fn test_map_report() {
        let session = session();
        let builder = ClusterBuilder::new(Arc::new(GazetteerResolver::russian_cities()));
        let map = MapView::with_seed(builder, 7);

        let report = MapReport::from_session(&session, &map);
        assert_eq!(report.clusters.len(), 2);
        let text = report.to_text();
        assert!(text.contains("* Казань"));
        assert!(text.contains("- Пермь"));

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["clusters"][0]["count"], 2);
    }

    #[test]
    fn test_stats_follow_filter() {
        let session = session();
        session.set_criteria(FilterCriteria::new().with_region("Казань"));
        let report = StatsReport::from_session(&session);

        assert_eq!(report.overview.total_projects, 2);
        assert_eq!(report.overview.winners_requested, 300_000);
        assert!(report.to_text().contains("Сумма грантов победителей: 300 000 ₽"));
    }

    #[test]
    fn test_detail_report_found_outside_filter() {
        let session = session();
        session.set_criteria(FilterCriteria::new().with_region("Казань"));

        let report = DetailReport::find(&session, &GrantId::Number(3)).unwrap();
        let text = report.to_text();
        assert!(text.starts_with("#3 Музей\n"));
        assert!(text.contains("Цель: Сохранить коллекцию"));
        assert!(text.contains("Сайт: https://museum.example"));
        assert!(!text.contains("Описание"));

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["record"]["web_site"], "https://museum.example");
        assert_eq!(json["amount"], "0 ₽");
    }

    #[test]
    fn test_detail_report_not_found() {
        let session = session();
        assert!(DetailReport::find(&session, &GrantId::Number(42)).is_none());
        assert!(DetailReport::find(&session, &GrantId::from("3")).is_none());
    }

    #[test]
    fn test_facets_text() {
        let session = session();
        let text = facets_text(&session.facets());
        assert!(text.contains("Годы: 2023, 2022"));
        assert!(text.contains("Регионы: Казань, Пермь"));
    }
}
