//! A small scoreboard driven through a store with logging and history.
//!
//! Run with: RUST_LOG=frost_state=debug cargo run --example scoreboard

use frost_state::{
    label, Action, Dispatch, FrostError, FrostResult, History, Next, Partial, State, Store,
    TraceActions, TraceLevel, Update, Value,
};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, State)]
struct Player {
    #[frost(rename = "firstName")]
    first_name: String,
    #[frost(rename = "lastName")]
    last_name: String,
}

#[derive(Debug, Clone, PartialEq, State)]
struct Game {
    score: i64,
    player: Player,
    bonuses: BTreeMap<String, i64>,
}

struct Scoreboard {
    store: Store<Game>,
}

impl Scoreboard {
    fn score(&self, points: i64) -> FrostResult<()> {
        self.store
            .labeled(label!())
            .update(Game::lens().score(), |s| s + points)
    }

    fn rename(&self, first: &str) -> FrostResult<()> {
        self.store
            .labeled(label!())
            .patch(Game::lens().player(), Partial::new().field("firstName", first))
    }

    fn award(&self, name: &str, points: i64) -> FrostResult<()> {
        let lens = Game::lens();
        self.store.labeled(label!()).batch(vec![
            Update::set(lens.bonuses().at(name), points),
            Update::apply(lens.score(), move |s| s + points),
        ])
    }
}

fn main() {
    tracing_subscriber::fmt()
        .compact()
        .with_target(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let history = History::new().with_max_entries(32);
    let store = Store::builder(Game {
        score: 0,
        player: Player {
            first_name: "Wall".into(),
            last_name: "Enberg".into(),
        },
        bonuses: BTreeMap::new(),
    })
    .with_middleware(history.clone())
    .with_middleware(TraceActions::new().with_level(TraceLevel::Info))
    .with_middleware(|_: &Value, action: &Action, next: Next<'_>| -> FrostResult<Value> {
        if action.entries().iter().any(|e| e.value.as_i64().is_some_and(|n| n < -100)) {
            return Err(FrostError::rejected(action.label(), "penalty too large"));
        }
        next.run(action)
    })
    .build();

    store.subscribe(|commit| {
        println!(
            "{:<20} {}",
            commit.action.label(),
            commit.current.to_json()
        );
    });

    let board = Scoreboard { store };
    let steps: [(&str, FrostResult<()>); 4] = [
        ("score 1", board.score(1)),
        ("rename", board.rename("Avery")),
        ("award", board.award("speedrun", 10)),
        ("penalty", board.score(-500)),
    ];
    for (step, result) in steps {
        if let Err(err) = result {
            println!("{step:<20} failed: {err}");
        }
    }

    println!("history: {:?}", history.labels());
}
