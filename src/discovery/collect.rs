use core::{fmt, time::Duration};
use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use anyhow::Context;
use dscr::{scrape::Document, util::origin_of};
use tokio::time::sleep;

use crate::extract::{Record, extract};

/// What the collector needs from a browser tab.
pub trait Surface {
    async fn snapshot(&self) -> anyhow::Result<Document>;
    async fn advance(&self) -> anyhow::Result<()>;
}

#[derive(Debug, Clone, Copy)]
pub struct Limits {
    pub target: usize,
    /// Consecutive unchanged passes that mean the feed is exhausted.
    pub stall_tries: u32,
    pub max_scrolls: u32,
}

impl Limits {
    pub const fn new(target: usize) -> Self {
        Self {
            target,
            stall_tries: 5,
            max_scrolls: 200,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stop {
    TargetReached,
    EndOfList,
    ScrollLimit,
}

impl fmt::Display for Stop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::TargetReached => "target reached",
            Self::EndOfList => "end of list detected",
            Self::ScrollLimit => "scroll limit reached",
        })
    }
}

#[derive(Debug, Default)]
pub struct LoopState {
    last_count: usize,
    same_tries: u32,
    scrolls: u32,
}

impl LoopState {
    pub const fn scrolls(&self) -> u32 {
        self.scrolls
    }

    /// Feeds one pass's count. Stall detection looks at the count only, not which cards made it.
    pub const fn observe(&mut self, count: usize, limits: &Limits) -> Option<Stop> {
        if count >= limits.target {
            return Some(Stop::TargetReached);
        }

        if count == self.last_count && count > 0 {
            self.same_tries += 1;
            if self.same_tries >= limits.stall_tries {
                return Some(Stop::EndOfList);
            }
        } else {
            self.same_tries = 0;
        }

        self.last_count = count;

        self.scrolls += 1;
        if self.scrolls > limits.max_scrolls {
            return Some(Stop::ScrollLimit);
        }

        None
    }
}

#[derive(Debug)]
pub struct Collection {
    pub records: Vec<Record>,
    pub stop: Stop,
}

pub async fn collect<S: Surface>(
    surface: &S,
    limits: &Limits,
    pause: Duration,
) -> anyhow::Result<Collection> {
    let mut state = LoopState::default();

    loop {
        let document = surface.snapshot().await.context("snapshot failed")?;
        let origin = origin_of(&document.url)
            .with_context(|| format!("bad page url {:?}", document.url))?;
        let mut records = extract(&document.html, &origin);

        tracing::info!(
            target: "collector",
            "valid cards collected: {}/{} | scrolls: {}",
            records.len(),
            limits.target,
            state.scrolls(),
        );

        if let Some(stop) = state.observe(records.len(), limits) {
            records.truncate(limits.target);
            return Ok(Collection { records, stop });
        }

        surface.advance().await.context("scroll failed")?;
        sleep(pause).await;
    }
}

pub fn persist(path: &Path, records: &[Record]) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, records)?;
    writer.flush()?;
    Ok(())
}
