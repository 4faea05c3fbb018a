use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{Value, json};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn reelgrid(tmp: &Path, data_dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("reelgrid").expect("binary builds");
    cmd.current_dir(tmp)
        .env("REELGRID_DATA_DIR", data_dir)
        .env("REELGRID_CONFIG_PATH", tmp.join("no-config.toml"))
        .env_remove("REELGRID_FEED_URL")
        .env_remove("TMDB_API_KEY");
    cmd
}

fn record(title: &str, year: &str, link: &str, date: &str, rating: f64) -> Value {
    json!({
        "title": title,
        "year": year,
        "rating": rating,
        "link": link,
        "reviewLink": "",
        "date": date,
        "image": "",
        "poster": "",
        "backdrop": "",
        "description": "",
        "rewatch": false,
        "tags": [],
        "reviewText": ""
    })
}

fn seed(data_dir: &Path) {
    fs::create_dir_all(data_dir).expect("mkdir data");
    let snapshot = json!([
        record(
            "Arrival", "2016",
            "https://letterboxd.com/film/arrival/",
            "2024-03-02T18:00:00Z", 3.0
        ),
        record(
            "Heat", "1995",
            "https://letterboxd.com/film/heat/",
            "2024-01-10T18:00:00Z", 5.0
        ),
    ]);
    fs::write(data_dir.join("watch-history.json"), snapshot.to_string()).expect("snapshot");
}

#[test]
fn build_gives_live_records_precedence_and_writes_the_calendar() {
    let tmp = tempdir().expect("tempdir");
    let data = tmp.path().join("data");
    seed(&data);

    // The live feed re-logs Arrival with an edited rating, adds a new watch,
    // and carries one list entry that must be filtered out.
    let feed = json!([
        {
            "title": "Arrival", "year": "2016", "rating": 5.0,
            "link": "https://letterboxd.com/film/arrival/",
            "date": "2024-03-02", "reviewText": "rewatched"
        },
        {
            "title": "Tampopo", "year": "1985", "rating": 4.5,
            "link": "https://letterboxd.com/film/tampopo/",
            "date": "2024-04-04"
        },
        {
            "title": "Best of 2024",
            "link": "https://letterboxd.com/bayf/list/best-of-2024/",
            "date": "2024-12-31"
        }
    ]);
    let feed_path = tmp.path().join("feed.json");
    fs::write(&feed_path, feed.to_string()).expect("feed");

    reelgrid(tmp.path(), &data)
        .arg("build")
        .arg("--feed-file")
        .arg(&feed_path)
        .arg("--skip-enrich")
        .assert()
        .success()
        .stdout(predicate::str::contains("historical=2 records"))
        .stdout(predicate::str::contains("non-film 1"))
        .stdout(predicate::str::contains("merged=3 records"))
        .stdout(predicate::str::contains("calendar_years=2024"));

    let raw = fs::read_to_string(data.join("calendar.json")).expect("calendar");
    let calendar: Value = serde_json::from_str(&raw).expect("calendar json");

    assert_eq!(calendar["years"], json!([2024]));

    // Live precedence: the edited rating wins, and there is only one Arrival.
    let march_2 = calendar["moviesByDate"]["2024-03-02"]
        .as_array()
        .expect("bucket");
    assert_eq!(march_2.len(), 1);
    assert_eq!(march_2[0]["rating"], 5.0);
    assert_eq!(march_2[0]["reviewText"], "rewatched");

    // Fixed grid geometry: 12 months of 6 weeks of 7 cells.
    let months = calendar["calendarsByYear"]["2024"]["months"]
        .as_array()
        .expect("months");
    assert_eq!(months.len(), 12);
    for month in months {
        let weeks = month["weeks"].as_array().expect("weeks");
        assert_eq!(weeks.len(), 6);
        for week in weeks {
            assert_eq!(week.as_array().expect("week").len(), 7);
        }
    }

    // The new live watch landed in its cell.
    let april = &months[3];
    let cell = april["weeks"]
        .as_array()
        .expect("weeks")
        .iter()
        .flat_map(|week| week.as_array().expect("week"))
        .find(|cell| cell["date"] == "2024-04-04")
        .expect("cell");
    assert_eq!(cell["movies"].as_array().expect("movies").len(), 1);
    assert_eq!(cell["isCurrentMonth"], true);
}

#[test]
fn build_attaches_custom_quotes_and_backdrops() {
    let tmp = tempdir().expect("tempdir");
    let data = tmp.path().join("data");
    seed(&data);

    fs::write(
        data.join("custom-quotes.json"),
        json!({"2024-03-02": "Despite knowing the journey… I embrace it."}).to_string(),
    )
    .expect("quotes");
    fs::write(
        data.join("custom-backdrops.json"),
        json!({"arrival": "https://example.test/arrival.jpg"}).to_string(),
    )
    .expect("backdrops");

    reelgrid(tmp.path(), &data)
        .arg("build")
        .arg("--skip-feed")
        .arg("--skip-enrich")
        .assert()
        .success()
        .stdout(predicate::str::contains("enriched=1"));

    let raw = fs::read_to_string(data.join("calendar.json")).expect("calendar");
    let calendar: Value = serde_json::from_str(&raw).expect("calendar json");

    assert_eq!(
        calendar["quotesByDate"]["2024-03-02"],
        "Despite knowing the journey… I embrace it."
    );
    let march_2 = calendar["moviesByDate"]["2024-03-02"]
        .as_array()
        .expect("bucket");
    assert_eq!(march_2[0]["backdrop"], "https://example.test/arrival.jpg");
    assert_eq!(march_2[0]["image"], "https://example.test/arrival.jpg");
}

#[test]
fn build_with_no_sources_at_all_fails_hard() {
    let tmp = tempdir().expect("tempdir");
    let data = tmp.path().join("data");

    reelgrid(tmp.path(), &data)
        .arg("build")
        .arg("--skip-feed")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no usable watch records"));
}

#[test]
fn build_survives_a_broken_feed_with_historical_data() {
    let tmp = tempdir().expect("tempdir");
    let data = tmp.path().join("data");
    seed(&data);

    let feed_path = tmp.path().join("feed.json");
    fs::write(&feed_path, "<rss>not shaped records</rss>").expect("feed");

    reelgrid(tmp.path(), &data)
        .arg("build")
        .arg("--feed-file")
        .arg(&feed_path)
        .arg("--skip-enrich")
        .assert()
        .success()
        .stdout(predicate::str::contains("live feed: unavailable"))
        .stdout(predicate::str::contains("merged=2 records"));
}
