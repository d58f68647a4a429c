use anyhow::{Context, Result};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, LoaderTrait, Order, QueryFilter, QueryOrder,
    Set, TransactionTrait,
};
use serde::Deserialize;

use crate::entities::{participants, prelude::*, seasons};

/// One roster entry supplied when a season is created.
#[derive(Debug, Clone, Deserialize)]
pub struct ParticipantInput {
    pub habby_id: Option<String>,
    pub name: String,
    pub fase: i32,
    pub r1: i32,
    pub r2: i32,
    pub r3: i32,
    pub total: Option<i32>,
}

/// The most recent participation of one player, with ranking context.
#[derive(Debug, Clone)]
pub struct LatestParticipation {
    pub season_id: i32,
    pub start_date: String,
    pub position: Option<usize>,
    pub fase: i32,
    /// Stage delta versus the immediately prior season; `None` when this is
    /// the player's first recorded season.
    pub evolution: Option<i32>,
}

pub struct SeasonRepository {
    conn: DatabaseConnection,
}

impl SeasonRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// All seasons ascending by start date, each with its participant list.
    pub async fn list_with_participants(
        &self,
    ) -> Result<Vec<(seasons::Model, Vec<participants::Model>)>> {
        let seasons = Seasons::find()
            .order_by_asc(seasons::Column::StartDate)
            .all(&self.conn)
            .await
            .context("Failed to list seasons")?;

        let participants = seasons
            .load_many(Participants, &self.conn)
            .await
            .context("Failed to load season participants")?;

        Ok(seasons.into_iter().zip(participants).collect())
    }

    /// Creates the season and bulk-inserts its roster in one transaction.
    /// Returns the new season id.
    pub async fn create(
        &self,
        start_date: &str,
        end_date: &str,
        roster: Vec<ParticipantInput>,
    ) -> Result<i32> {
        let txn = self.conn.begin().await?;

        let season = Seasons::insert(seasons::ActiveModel {
            start_date: Set(start_date.to_string()),
            end_date: Set(end_date.to_string()),
            ..Default::default()
        })
        .exec(&txn)
        .await
        .context("Failed to insert season")?;

        let season_id = season.last_insert_id;

        if !roster.is_empty() {
            let rows: Vec<participants::ActiveModel> = roster
                .into_iter()
                .map(|p| participants::ActiveModel {
                    season_id: Set(season_id),
                    habby_id: Set(p.habby_id),
                    name: Set(p.name),
                    fase: Set(p.fase),
                    r1: Set(p.r1),
                    r2: Set(p.r2),
                    r3: Set(p.r3),
                    total: Set(p.total),
                    ..Default::default()
                })
                .collect();

            Participants::insert_many(rows)
                .exec(&txn)
                .await
                .context("Failed to insert participants")?;
        }

        txn.commit().await?;
        Ok(season_id)
    }

    /// The single most recent participation for `habby_id`, with its rank
    /// within that season and the stage delta versus the prior season.
    pub async fn latest_participation(
        &self,
        habby_id: &str,
    ) -> Result<Option<LatestParticipation>> {
        let participations = Participants::find()
            .find_also_related(Seasons)
            .filter(participants::Column::HabbyId.eq(habby_id))
            .order_by(seasons::Column::StartDate, Order::Desc)
            .all(&self.conn)
            .await
            .context("Failed to query participation history")?;

        let Some((current, Some(season))) = participations.first().cloned() else {
            return Ok(None);
        };

        let evolution = participations
            .get(1)
            .map(|(previous, _)| current.fase - previous.fase);

        let roster = Participants::find()
            .filter(participants::Column::SeasonId.eq(season.id))
            .all(&self.conn)
            .await
            .context("Failed to load season roster")?;

        Ok(Some(LatestParticipation {
            season_id: season.id,
            start_date: season.start_date,
            position: rank_position(&roster, habby_id),
            fase: current.fase,
            evolution,
        }))
    }
}

/// 1-based rank of `habby_id` within a season roster, ordered by `fase`
/// descending. Ties are broken by habby_id ascending so the ranking is
/// stable across reads.
fn rank_position(roster: &[participants::Model], habby_id: &str) -> Option<usize> {
    let mut ranked: Vec<&participants::Model> = roster.iter().collect();
    ranked.sort_by(|a, b| {
        b.fase
            .cmp(&a.fase)
            .then_with(|| a.habby_id.cmp(&b.habby_id))
    });

    ranked
        .iter()
        .position(|p| p.habby_id.as_deref() == Some(habby_id))
        .map(|i| i + 1)
}
