//! Player directory contracts and SQLite implementation.
//!
//! # Responsibility
//! - Resolve players by id for attendance referential checks.
//! - Provide the roster CRUD used by the players API.
//!
//! # Invariants
//! - Updating or deleting a player never touches attendance rows.
//! - `birth_date` is stored as `YYYY-MM-DD` text.

use crate::model::player::{NewPlayer, Player, PlayerId};
use crate::repo::{RepoError, RepoResult};
use chrono::NaiveDate;
use rusqlite::{params, Connection, Row};

const PLAYER_SELECT_SQL: &str = "SELECT
    id,
    name,
    surname,
    position,
    squad_number,
    birth_date,
    weight_kg
FROM players";

const BIRTH_DATE_FORMAT: &str = "%Y-%m-%d";

/// Read-only player lookup used by the attendance gateway.
pub trait PlayerDirectory {
    fn get_player(&self, id: PlayerId) -> RepoResult<Option<Player>>;
}

/// Full roster persistence for players.
pub trait PlayerRepository: PlayerDirectory {
    /// Validates and inserts a player, returning the stored record.
    fn create_player(&self, player: &NewPlayer, today: NaiveDate) -> RepoResult<Player>;
    /// Validates and replaces every field of an existing player.
    ///
    /// Returns `None` when no player has `id`.
    fn update_player(
        &self,
        id: PlayerId,
        player: &NewPlayer,
        today: NaiveDate,
    ) -> RepoResult<Option<Player>>;
    /// All players ordered by name, surname.
    fn list_players(&self) -> RepoResult<Vec<Player>>;
    /// Deletes one player; returns removed row count (0 or 1).
    fn delete_player(&self, id: PlayerId) -> RepoResult<usize>;
}

/// SQLite-backed player repository.
pub struct SqlitePlayerRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePlayerRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl PlayerDirectory for SqlitePlayerRepository<'_> {
    fn get_player(&self, id: PlayerId) -> RepoResult<Option<Player>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PLAYER_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_player_row(row)?));
        }
        Ok(None)
    }
}

impl PlayerRepository for SqlitePlayerRepository<'_> {
    fn create_player(&self, player: &NewPlayer, today: NaiveDate) -> RepoResult<Player> {
        let player = player.normalized();
        player.validate(today)?;

        let id: PlayerId = self.conn.query_row(
            "INSERT INTO players (
                name,
                surname,
                position,
                squad_number,
                birth_date,
                weight_kg
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            RETURNING id;",
            params![
                player.name.as_str(),
                player.surname.as_deref(),
                player.position.as_deref(),
                player.squad_number,
                player
                    .birth_date
                    .map(|date| date.format(BIRTH_DATE_FORMAT).to_string()),
                player.weight_kg,
            ],
            |row| row.get(0),
        )?;

        self.get_player(id)?.ok_or_else(|| {
            RepoError::InvalidData(format!("player {id} missing right after insert"))
        })
    }

    fn update_player(
        &self,
        id: PlayerId,
        player: &NewPlayer,
        today: NaiveDate,
    ) -> RepoResult<Option<Player>> {
        let player = player.normalized();
        player.validate(today)?;

        let changed = self.conn.execute(
            "UPDATE players
             SET name = ?1,
                 surname = ?2,
                 position = ?3,
                 squad_number = ?4,
                 birth_date = ?5,
                 weight_kg = ?6
             WHERE id = ?7;",
            params![
                player.name.as_str(),
                player.surname.as_deref(),
                player.position.as_deref(),
                player.squad_number,
                player
                    .birth_date
                    .map(|date| date.format(BIRTH_DATE_FORMAT).to_string()),
                player.weight_kg,
                id,
            ],
        )?;
        if changed == 0 {
            return Ok(None);
        }
        self.get_player(id)
    }

    fn list_players(&self) -> RepoResult<Vec<Player>> {
        let mut stmt = self.conn.prepare(&format!(
            "{PLAYER_SELECT_SQL}
             ORDER BY name COLLATE NOCASE ASC, surname COLLATE NOCASE ASC, id ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut players = Vec::new();
        while let Some(row) = rows.next()? {
            players.push(parse_player_row(row)?);
        }
        Ok(players)
    }

    fn delete_player(&self, id: PlayerId) -> RepoResult<usize> {
        let changed = self
            .conn
            .execute("DELETE FROM players WHERE id = ?1;", [id])?;
        Ok(changed)
    }
}

fn parse_player_row(row: &Row<'_>) -> RepoResult<Player> {
    let birth_date = match row.get::<_, Option<String>>("birth_date")? {
        Some(text) => Some(
            NaiveDate::parse_from_str(&text, BIRTH_DATE_FORMAT).map_err(|_| {
                RepoError::InvalidData(format!(
                    "invalid birth date `{text}` in players.birth_date"
                ))
            })?,
        ),
        None => None,
    };

    Ok(Player {
        id: row.get("id")?,
        name: row.get("name")?,
        surname: row.get("surname")?,
        position: row.get("position")?,
        squad_number: parse_squad_number(row.get("squad_number")?)?,
        birth_date,
        weight_kg: row.get("weight_kg")?,
    })
}

pub(crate) fn parse_squad_number(value: Option<i64>) -> RepoResult<Option<u8>> {
    value
        .map(|number| {
            u8::try_from(number)
                .ok()
                .filter(|number| (1..=99).contains(number))
                .ok_or_else(|| {
                    RepoError::InvalidData(format!(
                        "invalid squad number `{number}` in players.squad_number"
                    ))
                })
        })
        .transpose()
}
