//! HTML table extraction.
//!
//! Fetches the chart page and keeps only the `<table>` elements whose header
//! row has an "artist" column. That header is the only thing telling chart
//! tables apart from navigation or layout tables; everything else about a
//! table's shape is checked later by the normalizer.

use std::time::Duration;

use reqwest::blocking::Client;
use scraper::{ElementRef, Html, Selector};

use crate::dates::DateParser;
use crate::error::ScrapeError;

/// Header text that marks a chart table.
const CHART_COLUMN: &str = "artist";

/// A table as it appears on the page: its first row, then the rest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    /// Whether any header cell equals `name`, ignoring case and
    /// surrounding whitespace.
    pub fn has_column(&self, name: &str) -> bool {
        let name = name.to_lowercase();
        self.headers
            .iter()
            .any(|header| header.trim().to_lowercase() == name)
    }

    pub fn is_chart_table(&self) -> bool {
        self.has_column(CHART_COLUMN)
    }
}

/// A fetched chart page, reduced to what the pipeline keeps.
#[derive(Debug, Clone)]
pub struct ChartPage {
    pub tables: Vec<RawTable>,
    pub site_updated: Option<chrono::NaiveDate>,
}

/// Blocking HTTP fetcher for the chart page.
#[derive(Debug, Clone)]
pub struct ChartScraper {
    http: Client,
}

impl ChartScraper {
    /// Create a scraper whose requests time out after `timeout`.
    ///
    /// # Errors
    /// Returns an error if the underlying HTTP client cannot be created.
    pub fn new(timeout: Duration) -> Result<Self, ScrapeError> {
        let http = Client::builder()
            .user_agent(concat!("hitparade/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;
        Ok(Self { http })
    }

    /// Fetch the page body. Non-2xx responses are errors; nothing is
    /// retried.
    pub fn fetch(&self, url: &str) -> Result<String, ScrapeError> {
        let fetch_error = |message: String| ScrapeError::Fetch {
            url: url.to_string(),
            message,
        };

        let response = self
            .http
            .get(url)
            .send()
            .map_err(|e| fetch_error(e.to_string()))?
            .error_for_status()
            .map_err(|e| fetch_error(e.to_string()))?;

        response.text().map_err(|e| fetch_error(e.to_string()))
    }

    /// Fetch `url` and return its chart tables.
    pub fn extract_tables(&self, url: &str) -> Result<Vec<RawTable>, ScrapeError> {
        let html = self.fetch(url)?;
        Ok(select_chart_tables(parse_tables(&html)))
    }

    /// Fetch `url` and return its chart tables along with the page's
    /// "correct as of" date.
    pub fn scrape(&self, url: &str, dates: &DateParser) -> Result<ChartPage, ScrapeError> {
        let html = self.fetch(url)?;
        let tables = select_chart_tables(parse_tables(&html));
        log::info!("Found {} chart tables at {}", tables.len(), url);

        Ok(ChartPage {
            tables,
            site_updated: site_updated(&html, dates),
        })
    }
}

/// Keep only tables with an "artist" header column.
pub fn select_chart_tables(tables: Vec<RawTable>) -> Vec<RawTable> {
    tables.into_iter().filter(RawTable::is_chart_table).collect()
}

/// Parse every `<table>` in `html`. The first row of each table is taken as
/// its header row. Rows without cells are dropped and tables left without
/// rows are skipped.
pub fn parse_tables(html: &str) -> Vec<RawTable> {
    let document = Html::parse_document(html);
    let (Some(table_sel), Some(row_sel)) = (selector("table"), selector("tr")) else {
        return Vec::new();
    };

    let mut tables = Vec::new();
    for table in document.select(&table_sel) {
        let mut rows = table
            .select(&row_sel)
            .filter(|row| owning_table(*row).map(|t| t.id()) == Some(table.id()))
            .map(row_cells)
            .filter(|cells| !cells.is_empty());

        let Some(headers) = rows.next() else {
            continue;
        };
        tables.push(RawTable {
            headers,
            rows: rows.collect(),
        });
    }
    tables
}

/// Date printed in the first paragraph of the page, if it has one.
pub fn site_updated(html: &str, dates: &DateParser) -> Option<chrono::NaiveDate> {
    let document = Html::parse_document(html);
    let paragraph = document.select(&selector("p")?).next()?;
    dates.parse(&element_text(paragraph))
}

fn selector(css: &str) -> Option<Selector> {
    Selector::parse(css).ok()
}

/// The nearest enclosing `<table>`, so rows of nested tables are not
/// attributed to their parent.
fn owning_table(row: ElementRef<'_>) -> Option<ElementRef<'_>> {
    row.ancestors()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == "table")
}

fn row_cells(row: ElementRef<'_>) -> Vec<String> {
    row.children()
        .filter_map(ElementRef::wrap)
        .filter(|el| matches!(el.value().name(), "th" | "td"))
        .map(element_text)
        .collect()
}

fn element_text(el: ElementRef<'_>) -> String {
    el.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{MockServer, Route};
    use chrono::NaiveDate;

    const PAGE: &str = r#"
        <html><body>
          <p>Correct as of 3rd January 2019</p>
          <table class="nav"><tr><td>Home</td><td>Charts</td></tr></table>
          <table>
            <thead><tr><th>Date</th><th>Title</th><th>Artist</th><th>Weeks</th></tr></thead>
            <tbody>
              <tr><td>1 Jan 2000</td><td>Song A</td><td>Artist A</td><td>3</td></tr>
              <tr><td>2 Jan 2000</td><td>Song  B</td><td> Artist B </td><td>1</td></tr>
            </tbody>
          </table>
          <table><tr><td>Ad</td></tr></table>
        </body></html>
    "#;

    #[test]
    fn test_parse_tables_reads_every_table() {
        let tables = parse_tables(PAGE);
        assert_eq!(tables.len(), 3);
        assert_eq!(tables[0].headers, vec!["Home", "Charts"]);
        assert!(tables[2].rows.is_empty());
    }

    #[test]
    fn test_select_chart_tables_filters_on_artist_header() {
        let tables = select_chart_tables(parse_tables(PAGE));
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].headers, vec!["Date", "Title", "Artist", "Weeks"]);
        assert_eq!(tables[0].rows.len(), 2);
        assert_eq!(
            tables[0].rows[1],
            vec!["2 Jan 2000", "Song B", "Artist B", "1"]
        );
    }

    #[test]
    fn test_page_without_chart_tables_yields_empty() {
        let html = "<html><body><table><tr><th>Name</th></tr><tr><td>x</td></tr></table></body></html>";
        assert!(select_chart_tables(parse_tables(html)).is_empty());
        assert!(parse_tables("<html><body><p>nothing</p></body></html>").is_empty());
    }

    #[test]
    fn test_header_match_is_case_insensitive_and_exact() {
        let table = RawTable {
            headers: vec!["DATE".into(), " ARTIST ".into()],
            rows: Vec::new(),
        };
        assert!(table.is_chart_table());

        let table = RawTable {
            headers: vec!["Artists featured".into()],
            rows: Vec::new(),
        };
        assert!(!table.is_chart_table());
    }

    #[test]
    fn test_nested_table_rows_stay_with_inner_table() {
        let html = r#"
            <table>
              <tr><th>Artist</th></tr>
              <tr><td>Outer<table><tr><td>Inner</td></tr></table></td></tr>
            </table>
        "#;
        let tables = parse_tables(html);
        assert_eq!(tables.len(), 2);
        assert_eq!(tables[0].rows.len(), 1);
        assert_eq!(tables[1].headers, vec!["Inner"]);
    }

    #[test]
    fn test_empty_rows_are_skipped() {
        let html = r#"
            <table>
              <tr></tr>
              <tr><th>Date</th><th>Title</th><th>Artist</th><th>Weeks</th></tr>
              <tr><td>1 Jan 2000</td><td>Song A</td><td>Artist A</td><td>3</td></tr>
              <tr></tr>
              <tr><td>2 Jan 2000</td><td>Song B</td><td>Artist B</td><td>1</td></tr>
            </table>
            <table><tr></tr></table>
        "#;
        let tables = parse_tables(html);
        assert_eq!(tables.len(), 1);
        assert!(tables[0].is_chart_table());
        assert_eq!(tables[0].rows.len(), 2);
        assert!(tables[0].rows.iter().all(|row| row.len() == 4));
    }

    #[test]
    fn test_extract_tables_over_http() {
        let server = MockServer::bind();
        let base = server.serve(vec![
            Route::new("/number-ones", 200, PAGE),
            Route::new("/down", 503, "maintenance"),
        ]);
        let scraper = ChartScraper::new(Duration::from_secs(5)).unwrap();

        let tables = scraper.extract_tables(&format!("{base}/number-ones")).unwrap();
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].headers, vec!["Date", "Title", "Artist", "Weeks"]);
        assert_eq!(tables[0].rows.len(), 2);

        let url = format!("{base}/down");
        let err = scraper.extract_tables(&url).unwrap_err();
        assert!(matches!(err, ScrapeError::Fetch { url: ref failed, .. } if *failed == url));
        assert!(err.to_string().contains("503"));
    }

    #[test]
    fn test_site_updated_reads_first_paragraph() {
        let parser = DateParser::new(false);
        assert_eq!(
            site_updated(PAGE, &parser),
            NaiveDate::from_ymd_opt(2019, 1, 3)
        );
        assert_eq!(site_updated("<p>No date here</p>", &parser), None);
    }
}
