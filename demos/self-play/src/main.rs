use std::sync::Arc;

use chain_reaction::prelude::*;
use rand::seq::IndexedRandom;
use tokio::sync::Mutex;
use tracing::info;

// ---------------------------------------------------------------------------
// Bots
// ---------------------------------------------------------------------------

const BOTS: [&str; 3] = ["ada", "bram", "cleo"];

/// Safety valve for a game that refuses to end.
const MAX_TURNS: usize = 10_000;

/// Picks a random legal move for whoever holds the turn.
fn pick_move(engine: &GameEngine) -> Option<Move> {
    let mover = engine.current_player_id()?;
    let pos = *engine.legal_positions().choose(&mut rand::rng())?;
    Some(Move::new(mover, pos))
}

// ---------------------------------------------------------------------------
// Game loop
// ---------------------------------------------------------------------------

async fn play(
    registry: &Mutex<RoomRegistry>,
    room: &RoomId,
) -> Result<GameState, ChainReactionError> {
    for turn in 1..=MAX_TURNS {
        let mut guard = registry.lock().await;
        let engine = guard.engine_for(room)?;
        if engine.phase() == GamePhase::Over {
            return Ok(engine.into_state());
        }
        let Some(mv) = pick_move(&engine) else {
            break;
        };

        let outcome = guard.make_move(room, &mv)?;
        info!(
            turn,
            player_id = %mv.player_id,
            position = %mv.position,
            explosions = outcome.reactions.len(),
            dots = outcome.game_state.total_dots(),
            "move"
        );
    }
    Ok(registry.lock().await.engine_for(room)?.into_state())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let registry = Arc::new(Mutex::new(RoomRegistry::new(RoomConfig::default())));
    let sweeper = spawn_sweeper(Arc::clone(&registry), SweepConfig::default());

    let room = {
        let mut guard = registry.lock().await;
        let room = guard.create(BoardSize::SMALL).id;
        for bot in BOTS {
            guard.add_player(&room, PlayerId::from(bot), bot)?;
        }
        guard.start_game(&room)?;
        room
    };

    let state = play(&registry, &room).await?;

    // A replica reloading the final snapshot must see the same game.
    let bytes = encode_snapshot(&JsonCodec, &state)?;
    let reloaded = decode_snapshot(&JsonCodec, &bytes)?;
    if reloaded != state {
        return Err("snapshot changed across encode/decode".into());
    }

    match &state.winner {
        Some(winner) => println!(
            "{} ({}) wins with {} dots",
            winner.name, winner.color, winner.dot_count
        ),
        None if state.is_game_over => println!("game over, nobody left standing"),
        None => println!("stopped after {MAX_TURNS} turns without a winner"),
    }
    println!("{}", serde_json::to_string_pretty(&state)?);

    registry.lock().await.delete(&room);
    sweeper.abort();
    Ok(())
}
