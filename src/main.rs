/// Entry point and game loop.

mod ui;

use std::error::Error;
use std::thread::sleep;
use std::time::{Duration, Instant};

use loderunner::config::GameConfig;
use loderunner::domain::entity::Command;
use loderunner::sim::level;
use loderunner::sim::step;
use loderunner::sim::world::{Phase, World};
use ui::input::InputState;
use ui::renderer::{Banner, Renderer};

/// How a session ended.
enum Outcome {
    Victory,
    Defeat,
    Quit,
}

fn main() {
    env_logger::init();
    let config = GameConfig::load();
    let mut world = World::new(config.rules.clone());

    let mut renderer = Renderer::new();
    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let result = game_loop(&mut world, &mut renderer, &config);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    let outcome = match result {
        Ok(outcome) => outcome,
        Err(e) => {
            eprintln!("Game error: {e}");
            std::process::exit(1);
        }
    };

    println!();
    match outcome {
        Outcome::Victory => println!("You cleared every level!"),
        Outcome::Defeat => println!("Game over on level {}.", world.level),
        Outcome::Quit => println!("Bye."),
    }
    if let Some(p) = world.player.as_ref() {
        println!("Coins collected: {}", p.coins);
    }
}

fn game_loop(
    world: &mut World,
    renderer: &mut Renderer,
    config: &GameConfig,
) -> Result<Outcome, Box<dyn Error>> {
    let mut input = InputState::new();
    let frame_time = Duration::from_millis(config.timing.frame_ms);
    let cooldown = Duration::from_millis(config.timing.move_cooldown_ms);

    for (i, &number) in config.levels.iter().enumerate() {
        let def = level::read_level(&config.levels_dir, number)?;
        let report = level::load_level(world, &def);
        if !report.player_found {
            return Err(format!("level {number} has no player start").into());
        }
        renderer.set_banner(None);
        renderer.note_events(&world.take_events());

        let mut last_move: Option<Instant> = None;
        loop {
            let started = Instant::now();
            input.drain_events();
            if input.quit_requested() {
                return Ok(Outcome::Quit);
            }

            let can_move = last_move.map_or(true, |t| t.elapsed() >= cooldown);
            let command = input.command(can_move);
            if matches!(command, Some(Command::Move(_))) {
                last_move = Some(Instant::now());
            }

            let events = step::frame(world, command);
            renderer.note_events(&events);

            match world.phase {
                Phase::Playing => {}
                Phase::LevelComplete | Phase::Victory => break,
                Phase::GameOver => {
                    renderer.set_banner(Some(Banner::Defeat));
                    renderer.render(world)?;
                    wait_for_key(&mut input, frame_time);
                    return Ok(Outcome::Defeat);
                }
            }

            renderer.render(world)?;
            sleep(frame_time.saturating_sub(started.elapsed()));
        }

        if i + 1 < config.levels.len() {
            renderer.set_banner(Some(Banner::LevelCleared(number)));
            renderer.render(world)?;
            if pause(&mut input, Duration::from_millis(config.timing.level_pause_ms), frame_time) {
                return Ok(Outcome::Quit);
            }
        }
    }

    step::complete_game(world);
    renderer.note_events(&world.take_events());
    renderer.set_banner(Some(Banner::Victory));
    renderer.render(world)?;
    pause(&mut input, Duration::from_millis(config.timing.victory_pause_ms), frame_time);
    Ok(Outcome::Victory)
}

/// Block until any key is pressed.
fn wait_for_key(input: &mut InputState, poll_every: Duration) {
    loop {
        input.drain_events();
        if input.any_key_pressed() || input.quit_requested() {
            return;
        }
        sleep(poll_every);
    }
}

/// Sleep for `total` while still honoring quit. Returns true on quit.
fn pause(input: &mut InputState, total: Duration, poll_every: Duration) -> bool {
    let started = Instant::now();
    while started.elapsed() < total {
        input.drain_events();
        if input.quit_requested() {
            return true;
        }
        sleep(poll_every);
    }
    false
}
