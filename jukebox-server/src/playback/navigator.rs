//! Navigation Resolver
//!
//! Decides which track follows or precedes the current one. Queues are
//! consulted in priority order: the album override (while the current track
//! belongs to it), then the shuffled queue when shuffle is on, else the linear
//! queue. Absence is always `Ok(None)`; only storage failures are errors.

use jukebox_common::db::TrackId;
use rand::seq::SliceRandom;
use rand::Rng;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::db::Queue;
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Next,
    Previous,
}

/// Queue-priority navigation over the Queue Store
#[derive(Clone)]
pub struct Navigator {
    linear: Queue,
    shuffled: Queue,
    album: Queue,
}

impl Navigator {
    pub fn new(db: SqlitePool) -> Self {
        Self {
            linear: Queue::linear(db.clone()),
            shuffled: Queue::shuffled(db.clone()),
            album: Queue::album(db),
        }
    }

    pub fn linear(&self) -> &Queue {
        &self.linear
    }

    pub fn shuffled(&self) -> &Queue {
        &self.shuffled
    }

    pub fn album(&self) -> &Queue {
        &self.album
    }

    /// Track after `current`; `current == 0` means nothing was playing
    ///
    /// Leaving the end of the album override clears it and yields `None`.
    pub async fn next(&self, current: TrackId, shuffle_enabled: bool) -> Result<Option<TrackId>> {
        self.resolve(current, shuffle_enabled, Direction::Next).await
    }

    /// Track before `current`; `current == 0` means nothing was playing
    pub async fn previous(
        &self,
        current: TrackId,
        shuffle_enabled: bool,
    ) -> Result<Option<TrackId>> {
        self.resolve(current, shuffle_enabled, Direction::Previous)
            .await
    }

    async fn resolve(
        &self,
        current: TrackId,
        shuffle_enabled: bool,
        direction: Direction,
    ) -> Result<Option<TrackId>> {
        if let Some(position) = self.album.position_of(current).await? {
            let neighbour = match direction {
                Direction::Next => self.album.next_after(position).await?,
                Direction::Previous => self.album.previous_before(position).await?,
            };

            if neighbour.is_none() && direction == Direction::Next {
                info!("Album finished after track {}, clearing album queue", current);
                self.album.clear().await?;
            }
            return Ok(neighbour);
        }

        let active = if shuffle_enabled {
            self.heal_shuffle().await?;
            &self.shuffled
        } else {
            &self.linear
        };

        let resolved = match active.position_of(current).await? {
            Some(position) => match direction {
                Direction::Next => active.next_after(position).await?,
                Direction::Previous => active.previous_before(position).await?,
            },
            None => match direction {
                Direction::Next => active.first().await?,
                Direction::Previous => active.last().await?,
            },
        };

        debug!(
            "{:?} from {} in {:?} -> {:?}",
            direction,
            current,
            active.kind(),
            resolved
        );
        Ok(resolved)
    }

    /// Regenerate the shuffled queue when it is no longer a permutation of the linear one
    async fn heal_shuffle(&self) -> Result<()> {
        let mut linear = self.linear.list().await?;
        let mut shuffled = self.shuffled.list().await?;
        linear.sort_unstable();
        shuffled.sort_unstable();

        if linear != shuffled {
            let count = self.regenerate_shuffle().await?;
            info!("Shuffled queue was stale, regenerated {} entries", count);
        }
        Ok(())
    }

    /// Rewrite the shuffled queue as a fresh permutation of the linear queue
    pub async fn regenerate_shuffle(&self) -> Result<usize> {
        let mut track_ids = self.linear.list().await?;
        track_ids.shuffle(&mut rand::thread_rng());

        self.shuffled.replace_all(&track_ids).await?;
        Ok(track_ids.len())
    }

    /// Insert `track_id` at a random slot of the shuffled queue, keeping the
    /// relative order of everything already there
    pub async fn shuffle_in(&self, track_id: TrackId) -> Result<()> {
        let mut track_ids = self.shuffled.list().await?;
        let slot = rand::thread_rng().gen_range(0..=track_ids.len());
        track_ids.insert(slot, track_id);

        self.shuffled.replace_all(&track_ids).await?;
        debug!("Shuffled track {} in at slot {}", track_id, slot);
        Ok(())
    }
}
