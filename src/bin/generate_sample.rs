use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Datelike, Duration, NaiveDate};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use social_charts::data::aggregate::mean_by;
use social_charts::data::model::{CellValue, Row, Table};

const PLATFORMS: [(&str, f64); 4] = [
    ("Instagram", 1.4),
    ("Facebook", 1.0),
    ("Twitter", 0.7),
    ("LinkedIn", 0.5),
];
const POST_TYPES: [(&str, f64); 3] = [("Image", 1.0), ("Video", 1.5), ("Link", 0.6)];
const AGE_GROUPS: [(&str, f64); 4] = [
    ("18-25", 1.3),
    ("26-40", 1.0),
    ("41-55", 0.7),
    ("56+", 0.45),
];
const POSTS_PER_DAY: usize = 40;
const RAW_COLUMNS: [&str; 5] = ["Platform", "PostType", "Date", "Likes", "AgeGroup"];

/// Normal sample via Box-Muller.
fn gauss(rng: &mut impl Rng, mean: f64, std_dev: f64) -> f64 {
    let u1: f64 = rng.gen::<f64>().max(1e-15);
    let u2: f64 = rng.gen();
    mean + std_dev * (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}

/// One week of posts; likes scale with platform, post type, age and weekends.
fn generate_posts(rng: &mut StdRng) -> Result<Table> {
    let first_day = NaiveDate::from_ymd_opt(2024, 3, 1).context("invalid start date")?;
    let mut rows = Vec::with_capacity(7 * POSTS_PER_DAY);

    for day in 0..7 {
        let date = first_day + Duration::days(day);
        let label = format!("{} ({})", date.format("%-m/%-d/%Y"), date.format("%A"));
        let weekend_boost = if date.weekday().number_from_monday() >= 6 { 1.25 } else { 1.0 };

        for _ in 0..POSTS_PER_DAY {
            let &(platform, p) = PLATFORMS.choose(rng).unwrap_or(&PLATFORMS[0]);
            let &(post_type, t) = POST_TYPES.choose(rng).unwrap_or(&POST_TYPES[0]);
            let &(age_group, a) = AGE_GROUPS.choose(rng).unwrap_or(&AGE_GROUPS[0]);
            let mean = 300.0 * p * t * a * weekend_boost;
            let likes = gauss(rng, mean, mean * 0.35).max(0.0).round() as i64;

            let row: Row = BTreeMap::from([
                ("Platform".to_string(), CellValue::String(platform.into())),
                ("PostType".to_string(), CellValue::String(post_type.into())),
                ("Date".to_string(), CellValue::String(label.clone())),
                ("Likes".to_string(), CellValue::Integer(likes)),
                ("AgeGroup".to_string(), CellValue::String(age_group.into())),
            ]);
            rows.push(row);
        }
    }
    Ok(Table::from_rows(RAW_COLUMNS.iter().map(|c| c.to_string()).collect(), rows))
}

fn write_csv(path: &Path, table: &Table) -> Result<()> {
    let mut writer =
        csv::Writer::from_path(path).with_context(|| format!("creating {}", path.display()))?;
    writer.write_record(&table.column_names)?;
    for row in &table.rows {
        writer.write_record(table.column_names.iter().map(|col| match &row[col] {
            CellValue::Float(v) => format!("{v:.2}"),
            other => other.to_string(),
        }))?;
    }
    writer.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    let mut rng = StdRng::seed_from_u64(42);
    let posts = generate_posts(&mut rng)?;

    let dir = Path::new("data");
    std::fs::create_dir_all(dir).context("creating data directory")?;
    write_csv(&dir.join("socialMedia.csv"), &posts)?;

    let by_type = mean_by(&posts, &["Platform", "PostType"], "Likes", "AvgLikes")?;
    let mut order: Vec<usize> = (0..by_type.len()).collect();
    order.sort_by_key(|&i| {
        let platform = by_type.label(i, "Platform");
        PLATFORMS.iter().position(|(p, _)| *p == platform)
    });
    let by_type = by_type.subset(&order);
    write_csv(&dir.join("socialMediaAvg.csv"), &by_type)?;

    let by_day = mean_by(&posts, &["Date"], "Likes", "AvgLikes")?;
    write_csv(&dir.join("socialMediaTime.csv"), &by_day)?;

    println!(
        "Wrote {} posts, {} platform/type averages and {} daily averages to {}",
        posts.len(),
        by_type.len(),
        by_day.len(),
        dir.display()
    );
    Ok(())
}
