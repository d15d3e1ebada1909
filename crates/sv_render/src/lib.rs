use std::fmt::Write as _;
use std::path::Path;

use serde_json::{Map as JsonMap, Value as JsonValue};
use sv_core::core_api::{MutationReport, OperationMode, SaveOverview, SiteCount};
use sv_core::item_kind::ItemKind;

const LABEL_WIDTH: usize = 28;
const SITE_WIDTH: usize = 36;
const RULE_WIDTH: usize = 44;

pub fn render_overview_text(path: &Path, overview: &SaveOverview) -> String {
    let mut out = String::new();
    writeln!(&mut out, "Save: {}", path.display()).expect("writing to String cannot fail");
    writeln!(&mut out, "{}", "-".repeat(RULE_WIDTH)).expect("writing to String cannot fail");

    let rows: [(&str, String); 14] = [
        ("Ships", overview.ships.to_string()),
        ("Stored loadouts", overview.ship_loadouts.to_string()),
        ("Crew members", overview.crew_members.to_string()),
        ("Mercenaries", overview.mercenaries.to_string()),
        ("Towed objects", overview.towed_objects.to_string()),
        (
            "Stations (with market)",
            format!("{} ({})", overview.stations, overview.stations_with_market),
        ),
        ("Arena market", yes_no(overview.has_arena_market).to_string()),
        ("Sectors", overview.sectors.to_string()),
        ("Last sector cached", yes_no(overview.has_last_sector).to_string()),
        ("Cargo entries", overview.cargo_entries.to_string()),
        ("Installed equipment", overview.equipment_entries.to_string()),
        ("Market entries", overview.market_entries.to_string()),
        ("Drifting objects", overview.drifting_entries.to_string()),
        (
            "Total item references",
            total_references(overview).to_string(),
        ),
    ];
    for (label, value) in rows {
        writeln!(
            &mut out,
            "{:<width$}{}",
            format!("{label}:"),
            value,
            width = LABEL_WIDTH
        )
        .expect("writing to String cannot fail");
    }
    out
}

pub fn overview_to_json(path: &Path, overview: &SaveOverview) -> JsonValue {
    let mut out = JsonMap::new();
    out.insert(
        "path".to_string(),
        JsonValue::String(path.display().to_string()),
    );
    out.insert("ships".to_string(), JsonValue::from(overview.ships));
    out.insert(
        "ship_loadouts".to_string(),
        JsonValue::from(overview.ship_loadouts),
    );
    out.insert(
        "crew_members".to_string(),
        JsonValue::from(overview.crew_members),
    );
    out.insert(
        "mercenaries".to_string(),
        JsonValue::from(overview.mercenaries),
    );
    out.insert(
        "towed_objects".to_string(),
        JsonValue::from(overview.towed_objects),
    );
    out.insert("stations".to_string(), JsonValue::from(overview.stations));
    out.insert(
        "stations_with_market".to_string(),
        JsonValue::from(overview.stations_with_market),
    );
    out.insert(
        "has_arena_market".to_string(),
        JsonValue::Bool(overview.has_arena_market),
    );
    out.insert("sectors".to_string(), JsonValue::from(overview.sectors));
    out.insert(
        "has_last_sector".to_string(),
        JsonValue::Bool(overview.has_last_sector),
    );

    let mut entries = JsonMap::new();
    entries.insert("cargo".to_string(), JsonValue::from(overview.cargo_entries));
    entries.insert(
        "equipment".to_string(),
        JsonValue::from(overview.equipment_entries),
    );
    entries.insert(
        "market".to_string(),
        JsonValue::from(overview.market_entries),
    );
    entries.insert(
        "drifting".to_string(),
        JsonValue::from(overview.drifting_entries),
    );
    out.insert("entries".to_string(), JsonValue::Object(entries));

    JsonValue::Object(out)
}

pub fn render_report_text(report: &MutationReport) -> String {
    let (verb, count) = match report.mode {
        OperationMode::Remove => ("Removed", report.removed),
        OperationMode::Replace => ("Replaced", report.replaced),
    };
    format!(
        "{verb} {count} {} across {} {}",
        plural(count, "entry", "entries"),
        report.containers_visited,
        plural(report.containers_visited, "container", "containers"),
    )
}

pub fn report_to_json(report: &MutationReport) -> JsonValue {
    let mut out = JsonMap::new();
    out.insert(
        "mode".to_string(),
        JsonValue::String(report.mode.as_str().to_string()),
    );
    out.insert("removed".to_string(), JsonValue::from(report.removed));
    out.insert("replaced".to_string(), JsonValue::from(report.replaced));
    out.insert(
        "containers_visited".to_string(),
        JsonValue::from(report.containers_visited),
    );
    JsonValue::Object(out)
}

pub fn render_references_text(kind: ItemKind, item_id: i32, counts: &[SiteCount]) -> String {
    let mut out = String::new();
    if counts.is_empty() {
        writeln!(&mut out, "No references to {kind} {item_id}")
            .expect("writing to String cannot fail");
        return out;
    }

    let total: usize = counts.iter().map(|c| c.count).sum();
    writeln!(
        &mut out,
        "{total} {} to {kind} {item_id}:",
        plural(total, "reference", "references")
    )
    .expect("writing to String cannot fail");
    for entry in counts {
        writeln!(
            &mut out,
            "  {:<width$}{:>5}",
            entry.site.to_string(),
            entry.count,
            width = SITE_WIDTH
        )
        .expect("writing to String cannot fail");
    }
    out
}

pub fn references_to_json(kind: ItemKind, item_id: i32, counts: &[SiteCount]) -> JsonValue {
    let mut out = JsonMap::new();
    out.insert(
        "kind".to_string(),
        JsonValue::String(kind.as_str().to_string()),
    );
    out.insert("id".to_string(), JsonValue::from(item_id));
    out.insert(
        "total".to_string(),
        JsonValue::from(counts.iter().map(|c| c.count).sum::<usize>()),
    );
    out.insert(
        "sites".to_string(),
        JsonValue::Array(
            counts
                .iter()
                .map(|entry| {
                    let mut m = JsonMap::new();
                    m.insert(
                        "site".to_string(),
                        JsonValue::String(entry.site.to_string()),
                    );
                    m.insert("count".to_string(), JsonValue::from(entry.count));
                    JsonValue::Object(m)
                })
                .collect(),
        ),
    );
    JsonValue::Object(out)
}

/// One save name per line. Sentinel entries are printed as-is.
pub fn render_save_list(names: &[String]) -> String {
    let mut out = String::new();
    for name in names {
        writeln!(&mut out, "{name}").expect("writing to String cannot fail");
    }
    out
}

fn total_references(overview: &SaveOverview) -> usize {
    overview.cargo_entries
        + overview.equipment_entries
        + overview.market_entries
        + overview.drifting_entries
        + overview.towed_objects
}

fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}

fn plural<'a>(count: usize, one: &'a str, many: &'a str) -> &'a str {
    if count == 1 { one } else { many }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sv_core::core_api::ContainerSite;

    #[test]
    fn report_text_uses_mode_verb_and_plurals() {
        let report = MutationReport {
            mode: OperationMode::Replace,
            removed: 0,
            replaced: 1,
            containers_visited: 3,
        };
        assert_eq!(
            render_report_text(&report),
            "Replaced 1 entry across 3 containers"
        );
    }

    #[test]
    fn references_json_keeps_site_order() {
        let counts = [
            SiteCount {
                site: ContainerSite::PlayerShipEquipment,
                count: 2,
            },
            SiteCount {
                site: ContainerSite::StationMarket(4),
                count: 1,
            },
        ];
        let json = references_to_json(ItemKind::Equipment, 12, &counts);

        assert_eq!(json["kind"], "equipment");
        assert_eq!(json["total"], 3);
        assert_eq!(json["sites"][0]["site"], "player ship equipment");
        assert_eq!(json["sites"][1]["site"], "station #4 market");
    }

    #[test]
    fn references_text_for_no_matches() {
        assert_eq!(
            render_references_text(ItemKind::GenericItem, 3, &[]),
            "No references to item 3\n"
        );
    }

    #[test]
    fn overview_json_field_order_is_stable() {
        let json = overview_to_json(Path::new("SaveGameData_01.dat"), &SaveOverview::default());
        let keys: Vec<&str> = json
            .as_object()
            .map(|m| m.keys().map(String::as_str).collect())
            .unwrap_or_default();
        assert_eq!(keys.first(), Some(&"path"));
        assert_eq!(keys.last(), Some(&"entries"));
        assert_eq!(json["entries"]["cargo"], 0);
    }
}
