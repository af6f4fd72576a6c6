// src/snapshot.rs
// This module holds the point-in-time copies of game state received from the
// realtime store: the winners-by-prize mapping and the whole game node.
//
// The store hands back whatever the web client wrote, so decoding is lenient:
// null entries, sparse arrays and numeric-keyed objects are all accepted and
// anything unreadable is treated as empty.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::booking::BookingDirectory;
use crate::defs::is_valid_number;
use crate::prize::PrizeType;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TicketId(String);

impl TicketId {
    pub fn new(id: impl Into<String>) -> Self {
        TicketId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => {
                let s = s.trim();
                if s.is_empty() { None } else { Some(TicketId(s.to_string())) }
            }
            Value::Number(n) => {
                if let Some(u) = n.as_u64() {
                    Some(TicketId(u.to_string()))
                } else if let Some(i) = n.as_i64() {
                    Some(TicketId(i.to_string()))
                } else {
                    // 12.0 comes back from some writers for integer ids
                    n.as_f64().map(|f| {
                        if f.fract() == 0.0 {
                            TicketId(format!("{}", f as i64))
                        } else {
                            TicketId(f.to_string())
                        }
                    })
                }
            }
            _ => None,
        }
    }
}

impl fmt::Display for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TicketId {
    fn from(id: &str) -> Self {
        TicketId::new(id)
    }
}

/// Items of a possibly sparse JSON collection, holes removed.
///
/// Arrays keep their order. Objects (how the store returns arrays with
/// holes) are ordered by numeric key when every key is numeric and by key
/// otherwise. Anything else yields nothing.
pub fn sparse_items(value: &Value) -> Vec<&Value> {
    match value {
        Value::Array(items) => items.iter().filter(|item| !item.is_null()).collect(),
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> =
                map.iter().filter(|(_, item)| !item.is_null()).collect();
            if entries.iter().all(|(key, _)| key.parse::<u64>().is_ok()) {
                entries.sort_by_key(|(key, _)| key.parse::<u64>().unwrap_or(u64::MAX));
            } else {
                entries.sort_by(|a, b| a.0.cmp(b.0));
            }
            entries.into_iter().map(|(_, item)| item).collect()
        }
        _ => Vec::new(),
    }
}

/// Who has won what at a point in time. Replaced wholesale on every update.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WinnerSnapshot {
    winners: HashMap<PrizeType, Vec<TicketId>>,
}

impl WinnerSnapshot {
    pub fn new() -> Self {
        WinnerSnapshot { winners: HashMap::new() }
    }

    pub fn with<I, T>(mut self, prize: PrizeType, ids: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<TicketId>,
    {
        let mut list: Vec<TicketId> = Vec::new();
        for id in ids {
            let id = id.into();
            if !list.contains(&id) {
                list.push(id);
            }
        }
        self.winners.insert(prize, list);
        self
    }

    /// Decode the `winners` node. Never fails.
    pub fn from_value(value: &Value) -> Self {
        let mut winners = HashMap::new();
        if let Value::Object(map) = value {
            for (key, ids) in map {
                let Some(prize) = PrizeType::from_key(key) else {
                    log::debug!("Ignoring unknown prize key '{key}'");
                    continue;
                };
                let mut list: Vec<TicketId> = Vec::new();
                for item in sparse_items(ids) {
                    if let Some(id) = TicketId::from_value(item) {
                        if !list.contains(&id) {
                            list.push(id);
                        }
                    }
                }
                winners.insert(prize, list);
            }
        }
        WinnerSnapshot { winners }
    }

    pub fn get(&self, prize: PrizeType) -> &[TicketId] {
        self.winners.get(&prize).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, prize: PrizeType, ticket_id: &TicketId) -> bool {
        self.get(prize).contains(ticket_id)
    }

    pub fn winner_count(&self) -> usize {
        self.winners.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.winner_count() == 0
    }
}

impl<'de> Deserialize<'de> for WinnerSnapshot {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(WinnerSnapshot::from_value(&value))
    }
}

#[derive(Debug, Clone, Default)]
pub struct GameState {
    pub winners: WinnerSnapshot,
    pub directory: BookingDirectory,
    pub called_numbers: Vec<u8>,
}

impl GameState {
    /// Decode a game node. Missing or malformed children decode as empty.
    pub fn from_value(value: &Value) -> Self {
        let winners = WinnerSnapshot::from_value(&value["winners"]);
        let directory = BookingDirectory::from_values(&value["bookings"], &value["players"]);

        let called_source = if value["calledNumbers"].is_null() {
            &value["numbersCalled"]
        } else {
            &value["calledNumbers"]
        };
        let called_numbers = sparse_items(called_source)
            .into_iter()
            .filter_map(|item| match item {
                Value::Number(n) => n.as_u64(),
                Value::String(s) => s.trim().parse::<u64>().ok(),
                _ => None,
            })
            .filter_map(|n| u8::try_from(n).ok())
            .filter(|n| is_valid_number(*n))
            .collect();

        GameState { winners, directory, called_numbers }
    }

    pub fn last_called(&self) -> Option<u8> {
        self.called_numbers.last().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_ticket_id_from_string_and_number() {
        assert_eq!(TicketId::from_value(&json!("47")), Some(TicketId::new("47")));
        assert_eq!(TicketId::from_value(&json!(47)), Some(TicketId::new("47")));
        assert_eq!(TicketId::from_value(&json!(47.0)), Some(TicketId::new("47")));
        assert_eq!(TicketId::from_value(&json!(" ")), None);
        assert_eq!(TicketId::from_value(&Value::Null), None);
        assert_eq!(TicketId::from_value(&json!(true)), None);
    }

    #[test]
    fn test_snapshot_skips_holes_and_unknown_keys() {
        let snapshot = WinnerSnapshot::from_value(&json!({
            "fullHouse": ["12", null, 47],
            "corners": null,
            "jackpotLine": ["3"]
        }));
        assert_eq!(snapshot.get(PrizeType::FullHouse), &[TicketId::new("12"), TicketId::new("47")]);
        assert!(snapshot.get(PrizeType::Corners).is_empty());
        assert_eq!(snapshot.winner_count(), 2);
    }

    #[test]
    fn test_snapshot_reads_numeric_keyed_objects_in_order() {
        let snapshot = WinnerSnapshot::from_value(&json!({
            "topLine": { "10": "c", "2": "b", "0": "a" }
        }));
        let ids: Vec<&str> = snapshot.get(PrizeType::TopLine).iter().map(TicketId::as_str).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_snapshot_drops_repeated_ids() {
        let snapshot = WinnerSnapshot::from_value(&json!({ "topLine": ["9", "9", 9] }));
        assert_eq!(snapshot.get(PrizeType::TopLine).len(), 1);
    }

    #[test]
    fn test_snapshot_from_non_object_is_empty() {
        assert!(WinnerSnapshot::from_value(&Value::Null).is_empty());
        assert!(WinnerSnapshot::from_value(&json!([1, 2, 3])).is_empty());
        let snapshot: WinnerSnapshot = serde_json::from_str("\"oops\"").unwrap();
        assert!(snapshot.is_empty());
    }

    #[test]
    fn test_game_state_decoding() {
        let state = GameState::from_value(&json!({
            "winners": { "quickFive": [5] },
            "calledNumbers": [17, null, "42", 0, 91, 8],
            "bookings": [null, { "ticketId": 5, "playerName": "Asha" }]
        }));
        assert_eq!(state.winners.get(PrizeType::QuickFive), &[TicketId::new("5")]);
        assert_eq!(state.called_numbers, vec![17, 42, 8]);
        assert_eq!(state.last_called(), Some(8));
        assert_eq!(state.directory.resolve(&TicketId::new("5")), Some("Asha".to_string()));
    }

    #[test]
    fn test_game_state_from_garbage() {
        let state = GameState::from_value(&json!("not a game"));
        assert!(state.winners.is_empty());
        assert!(state.called_numbers.is_empty());
        assert_eq!(state.last_called(), None);
    }
}
