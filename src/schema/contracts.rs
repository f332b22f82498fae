//! The contracts the pipeline's output tables are held to.

use super::{ColumnContract, ColumnKind, ContractColumn};
use crate::cli::types::TableKind;
use crate::model::EnrichedEvent;
use serde_json::{Map, Value};

const ONICE_STATS: &[&str] = &[
    "toi", "gf", "ga", "sf", "sa", "msf", "msa", "bsf", "bsa", "ff", "fa", "cf", "ca", "xgf",
    "xga", "gf_adj", "ga_adj", "sf_adj", "sa_adj", "ff_adj", "fa_adj", "cf_adj", "ca_adj",
    "xgf_adj", "xga_adj", "gf_percent", "sf_percent", "ff_percent", "cf_percent", "xgf_percent",
    "gf_p60", "ga_p60", "xgf_p60", "xga_p60",
];

const INDIVIDUAL_STATS: &[&str] = &[
    "toi", "g", "a1", "a2", "isf", "imsf", "iff", "icf", "ixg", "blk", "fow", "fol", "pent",
    "pend", "give", "take", "hits", "hits_taken", "g_p60", "a1_p60", "a2_p60", "isf_p60",
    "icf_p60", "ixg_p60", "blk_p60",
];

/// Contract for one StatRecord table shape.
pub fn stat_contract(table: TableKind) -> ColumnContract {
    let mut columns = vec![
        ContractColumn::required("season", ColumnKind::Int),
        ContractColumn::optional("session", ColumnKind::Str, Value::from("")),
        ContractColumn::optional("game_id", ColumnKind::Int, Value::from(0)),
        ContractColumn::optional("game_date", ColumnKind::Str, Value::from("")),
        ContractColumn::optional("period", ColumnKind::Int, Value::from(0)),
        ContractColumn::required("team", ColumnKind::Str),
        ContractColumn::optional("opp_team", ColumnKind::Str, Value::from("")),
        ContractColumn::optional("strength_state", ColumnKind::Str, Value::from("ALL")),
        ContractColumn::optional("score_state", ColumnKind::Str, Value::from("ALL")),
    ];

    match table {
        TableKind::Individual | TableKind::OnIce => {
            columns.push(ContractColumn::required("player", ColumnKind::Str));
            columns.push(ContractColumn::required("player_name", ColumnKind::Str));
        }
        TableKind::Line => {
            columns.push(ContractColumn::required("unit", ColumnKind::Str));
        }
        TableKind::Team => {}
    }

    if table != TableKind::Team {
        columns.push(ContractColumn::optional(
            "teammates",
            ColumnKind::Str,
            Value::from(""),
        ));
        columns.push(ContractColumn::optional(
            "opposition",
            ColumnKind::Str,
            Value::from(""),
        ));
    }

    let stats = match table {
        TableKind::Individual => INDIVIDUAL_STATS,
        _ => ONICE_STATS,
    };
    for stat in stats {
        columns.push(ContractColumn::required(stat, ColumnKind::Float));
    }

    let name = match table {
        TableKind::Individual => "individual",
        TableKind::OnIce => "on-ice",
        TableKind::Team => "team",
        TableKind::Line => "line",
    };
    ColumnContract { name, columns }
}

/// Contract for the flat enriched-event table emitted by processing.
pub fn event_contract() -> ColumnContract {
    ColumnContract {
        name: "events",
        columns: vec![
            ContractColumn::required("game_id", ColumnKind::Int),
            ContractColumn::required("season", ColumnKind::Int),
            ContractColumn::required("session", ColumnKind::Str),
            ContractColumn::optional("game_date", ColumnKind::Str, Value::from("")),
            ContractColumn::required("period", ColumnKind::Int),
            ContractColumn::required("period_seconds", ColumnKind::Int),
            ContractColumn::required("game_seconds", ColumnKind::Int),
            ContractColumn::required("event_index", ColumnKind::Int),
            ContractColumn::required("event_type", ColumnKind::Str),
            ContractColumn::required("team", ColumnKind::Str),
            ContractColumn::required("opp_team", ColumnKind::Str),
            ContractColumn::required("is_home", ColumnKind::Bool),
            ContractColumn::optional("p1", ColumnKind::Str, Value::from("")),
            ContractColumn::optional("p2", ColumnKind::Str, Value::from("")),
            ContractColumn::optional("p3", ColumnKind::Str, Value::from("")),
            ContractColumn::required("home_skaters", ColumnKind::Int),
            ContractColumn::required("away_skaters", ColumnKind::Int),
            ContractColumn::required("strength_state", ColumnKind::Str),
            ContractColumn::required("score_state", ColumnKind::Str),
            ContractColumn::required("home_score", ColumnKind::Int),
            ContractColumn::required("away_score", ColumnKind::Int),
            ContractColumn::optional("zone", ColumnKind::Str, Value::from("")),
            ContractColumn::optional("danger", ColumnKind::Str, Value::from("")),
            ContractColumn::required("event_length", ColumnKind::Int),
            ContractColumn::required("excluded_from_onice", ColumnKind::Bool),
            ContractColumn::optional("xg", ColumnKind::Float, Value::from(0.0)),
            ContractColumn::required("goal_adj", ColumnKind::Float),
            ContractColumn::required("shot_adj", ColumnKind::Float),
            ContractColumn::required("miss_adj", ColumnKind::Float),
            ContractColumn::required("block_adj", ColumnKind::Float),
            ContractColumn::required("fenwick_adj", ColumnKind::Float),
            ContractColumn::required("corsi_adj", ColumnKind::Float),
            ContractColumn::required("xg_adj", ColumnKind::Float),
        ],
    }
}

/// Flatten one enriched event into an event-table row.
pub fn event_row(event: &EnrichedEvent) -> Map<String, Value> {
    let mut row = Map::new();
    row.insert("game_id".to_string(), Value::from(event.game_id.as_u64()));
    row.insert("season".to_string(), Value::from(event.season.as_u16()));
    row.insert("session".to_string(), Value::from(event.session.to_string()));
    if let Some(date) = &event.game_date {
        row.insert("game_date".to_string(), Value::from(date.clone()));
    }
    row.insert("period".to_string(), Value::from(event.period));
    row.insert(
        "period_seconds".to_string(),
        Value::from(event.period_seconds),
    );
    row.insert("game_seconds".to_string(), Value::from(event.game_seconds));
    row.insert("event_index".to_string(), Value::from(event.event_index));
    row.insert(
        "event_type".to_string(),
        Value::from(event.event_type.as_str()),
    );
    row.insert("team".to_string(), Value::from(event.team.clone()));
    row.insert("opp_team".to_string(), Value::from(event.opp_team.clone()));
    row.insert("is_home".to_string(), Value::from(event.is_home));
    for (name, player) in [("p1", &event.p1), ("p2", &event.p2), ("p3", &event.p3)] {
        if let Some(p) = player {
            row.insert(name.to_string(), Value::from(p.key.clone()));
        }
    }
    row.insert(
        "home_skaters".to_string(),
        Value::from(event.home_skaters),
    );
    row.insert(
        "away_skaters".to_string(),
        Value::from(event.away_skaters),
    );
    row.insert(
        "strength_state".to_string(),
        Value::from(event.strength_state.clone()),
    );
    row.insert(
        "score_state".to_string(),
        Value::from(event.score_state.clone()),
    );
    row.insert("home_score".to_string(), Value::from(event.home_score));
    row.insert("away_score".to_string(), Value::from(event.away_score));
    if let Some(zone) = event.zone {
        row.insert("zone".to_string(), Value::from(zone.as_str()));
    }
    if let Some(danger) = event.danger {
        row.insert("danger".to_string(), Value::from(danger.as_str()));
    }
    row.insert("event_length".to_string(), Value::from(event.event_length));
    row.insert(
        "excluded_from_onice".to_string(),
        Value::from(event.excluded_from_onice),
    );
    if let Some(xg) = event.xg {
        row.insert("xg".to_string(), Value::from(xg));
    }
    for (name, value) in [
        ("goal_adj", event.adj.goal_adj),
        ("shot_adj", event.adj.shot_adj),
        ("miss_adj", event.adj.miss_adj),
        ("block_adj", event.adj.block_adj),
        ("fenwick_adj", event.adj.fenwick_adj),
        ("corsi_adj", event.adj.corsi_adj),
        ("xg_adj", event.adj.xg_adj),
    ] {
        row.insert(name.to_string(), Value::from(value));
    }
    row
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::validate;

    #[test]
    fn test_stat_contracts_key_columns() {
        let ind = stat_contract(TableKind::Individual);
        assert!(ind.columns.iter().any(|c| c.name == "player"));
        assert!(ind.columns.iter().any(|c| c.name == "g_p60"));
        let team = stat_contract(TableKind::Team);
        assert!(team.columns.iter().all(|c| c.name != "player"));
        assert!(team.columns.iter().all(|c| c.name != "teammates"));
        let line = stat_contract(TableKind::Line);
        assert!(line.columns.iter().any(|c| c.name == "unit"));
    }

    #[test]
    fn test_event_row_satisfies_event_contract() {
        let event = crate::aggregate::tests::sample_event();
        let table = validate(vec![event_row(&event)], &event_contract()).unwrap();
        assert_eq!(table.rows.len(), 1);
        assert_eq!(
            table.get(0, "event_type"),
            Some(&Value::from("SHOT"))
        );
        assert_eq!(table.get(0, "p2"), Some(&Value::from("")));
    }

    #[test]
    fn test_event_contract_carries_all_adjusted_variants() {
        let contract = event_contract();
        for name in [
            "goal_adj",
            "shot_adj",
            "miss_adj",
            "block_adj",
            "fenwick_adj",
            "corsi_adj",
            "xg_adj",
            "period_seconds",
        ] {
            let column = contract
                .columns
                .iter()
                .find(|c| c.name == name)
                .unwrap_or_else(|| panic!("missing column {name}"));
            assert!(column.default.is_none(), "{name} must be required");
        }
        let event = crate::aggregate::tests::sample_event();
        let table = validate(vec![event_row(&event)], &contract).unwrap();
        assert_eq!(table.get(0, "shot_adj"), Some(&Value::from(1.01)));
        assert_eq!(table.get(0, "goal_adj"), Some(&Value::from(0.0)));
        assert_eq!(table.get(0, "period_seconds"), Some(&Value::from(600)));
    }
}
