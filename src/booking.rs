// src/booking.rs
// Ticket ownership data used to put a player name on a winning ticket.
//
// Bookings and the player index both arrive as sparse collections from the
// store, so every lookup skips holes instead of failing.

use serde_json::Value;

use crate::snapshot::{sparse_items, TicketId};

#[derive(Debug, Clone, PartialEq)]
pub struct BookingRecord {
    pub ticket_id: TicketId,
    pub player_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerTickets {
    pub name: String,
    pub tickets: Vec<TicketId>,
}

#[derive(Debug, Clone, Default)]
pub struct BookingDirectory {
    bookings: Vec<BookingRecord>,
    players: Vec<PlayerTickets>,
}

fn non_empty_str(value: &Value) -> Option<String> {
    value
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

static NULL: Value = Value::Null;

fn first_present<'a>(value: &'a Value, keys: &[&str]) -> &'a Value {
    keys.iter()
        .map(|key| &value[*key])
        .find(|v| !v.is_null())
        .unwrap_or(&NULL)
}

impl BookingDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_booking(mut self, ticket_id: impl Into<TicketId>, player_name: &str) -> Self {
        self.bookings.push(BookingRecord {
            ticket_id: ticket_id.into(),
            player_name: Some(player_name.to_string()),
        });
        self
    }

    pub fn with_player<I, T>(mut self, name: &str, tickets: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<TicketId>,
    {
        self.players.push(PlayerTickets {
            name: name.to_string(),
            tickets: tickets.into_iter().map(Into::into).collect(),
        });
        self
    }

    /// Decode the `bookings` and `players` nodes. Never fails.
    ///
    /// A booking is an object carrying `ticketId` (or `ticketNumber`) and
    /// `playerName` (or `name`). The player index is either a collection of
    /// `{name, tickets}` objects or an object keyed by player name whose
    /// values hold a `tickets` collection or are the collection themselves.
    pub fn from_values(bookings: &Value, players: &Value) -> Self {
        let bookings = sparse_items(bookings)
            .into_iter()
            .filter_map(|entry| {
                let ticket_id = TicketId::from_value(first_present(entry, &["ticketId", "ticketNumber", "ticket"]))?;
                let player_name = non_empty_str(first_present(entry, &["playerName", "name"]));
                Some(BookingRecord { ticket_id, player_name })
            })
            .collect();

        let mut index = Vec::new();
        match players {
            Value::Object(map) if !map.keys().all(|key| key.parse::<u64>().is_ok()) => {
                for (key, entry) in map {
                    let name = non_empty_str(first_present(entry, &["name", "playerName"]))
                        .or_else(|| non_empty_str(&Value::String(key.clone())));
                    let tickets = if entry.is_array() { entry } else { &entry["tickets"] };
                    if let Some(name) = name {
                        index.push(PlayerTickets { name, tickets: ticket_list(tickets) });
                    }
                }
            }
            _ => {
                for entry in sparse_items(players) {
                    if let Some(name) = non_empty_str(first_present(entry, &["name", "playerName"])) {
                        index.push(PlayerTickets { name, tickets: ticket_list(&entry["tickets"]) });
                    }
                }
            }
        }

        BookingDirectory { bookings, players: index }
    }

    /// Resolve a display name: direct booking first, then the player index.
    ///
    /// Returns `None` when neither source knows the ticket.
    pub fn resolve(&self, ticket_id: &TicketId) -> Option<String> {
        let booked = self
            .bookings
            .iter()
            .filter(|record| &record.ticket_id == ticket_id)
            .find_map(|record| record.player_name.clone());
        if booked.is_some() {
            return booked;
        }

        self.players
            .iter()
            .find(|player| player.tickets.contains(ticket_id))
            .map(|player| player.name.clone())
    }

    pub fn booking_count(&self) -> usize {
        self.bookings.len()
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }
}

fn ticket_list(value: &Value) -> Vec<TicketId> {
    sparse_items(value).into_iter().filter_map(TicketId::from_value).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_booking_wins_over_player_index() {
        let directory = BookingDirectory::new()
            .with_booking("7", "Booked Name")
            .with_player("Indexed Name", ["7"]);
        assert_eq!(directory.resolve(&TicketId::new("7")), Some("Booked Name".to_string()));
    }

    #[test]
    fn test_falls_back_to_player_index() {
        let directory = BookingDirectory::from_values(
            &json!([null, { "ticketId": "1", "playerName": "Ravi" }]),
            &json!([null, { "name": "Meera", "tickets": [null, 3, "4"] }]),
        );
        assert_eq!(directory.resolve(&TicketId::new("4")), Some("Meera".to_string()));
        assert_eq!(directory.resolve(&TicketId::new("3")), Some("Meera".to_string()));
        assert_eq!(directory.resolve(&TicketId::new("1")), Some("Ravi".to_string()));
    }

    #[test]
    fn test_unknown_ticket_resolves_to_none() {
        let directory = BookingDirectory::from_values(&Value::Null, &Value::Null);
        assert_eq!(directory.resolve(&TicketId::new("99")), None);
    }

    #[test]
    fn test_booking_without_name_defers_to_index() {
        let directory = BookingDirectory::from_values(
            &json!({ "0": { "ticketNumber": 12, "playerName": "" } }),
            &json!({ "Kiran": { "tickets": [12] } }),
        );
        assert_eq!(directory.booking_count(), 1);
        assert_eq!(directory.resolve(&TicketId::new("12")), Some("Kiran".to_string()));
    }

    #[test]
    fn test_player_index_keyed_by_name_with_bare_lists() {
        let directory = BookingDirectory::from_values(&Value::Null, &json!({ "Anil": [5, null, 6] }));
        assert_eq!(directory.player_count(), 1);
        assert_eq!(directory.resolve(&TicketId::new("6")), Some("Anil".to_string()));
    }

    #[test]
    fn test_malformed_entries_are_skipped() {
        let directory = BookingDirectory::from_values(
            &json!([42, "x", { "playerName": "No Ticket" }, { "ticketId": 8, "name": "Lata" }]),
            &json!("garbage"),
        );
        assert_eq!(directory.booking_count(), 1);
        assert_eq!(directory.resolve(&TicketId::new("8")), Some("Lata".to_string()));
    }
}
