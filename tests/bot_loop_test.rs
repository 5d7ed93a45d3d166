use hackmatch_bot::adapter::{JsonLinesSink, NullSink, TextBoardSource};
use hackmatch_bot::core::parse_text;
use hackmatch_bot::{Bot, BotConfig, Cycle, RunLimit};

const VERTICAL_RUN: &str =
    ".......\n.......\n.......\n.......\n.......\n.......\n.......\n..r....\ny.r.gbr\n___@___";

const SETTLED: &str =
    ".......\n.......\n.......\n.......\n.......\n.......\n.......\n.......\n....gbb\n___@___";

const CONFIG: &str = r#"
[solver]
solve_time_ms = 2000
max_depth = 6

[encoder]
action_delay_ms = 20
settle_delay_ms = 150
recenter = false

[keys]
grab = "space"
release = "space"

[bot]
poll_interval_ms = 0
"#;

fn config() -> BotConfig {
    let config = BotConfig::from_toml_str(CONFIG).unwrap();
    config.validate().unwrap();
    config
}

#[test]
fn bot_writes_one_json_line_per_new_board() {
    let config = config();
    let boards = vec![
        parse_text(VERTICAL_RUN).unwrap(),
        parse_text(VERTICAL_RUN).unwrap(),
        parse_text(SETTLED).unwrap(),
    ];
    let source = TextBoardSource::new(boards, config.table().unwrap());
    let sink = JsonLinesSink::new(Vec::new(), config.keymap().unwrap());

    let mut bot = Bot::new(&config, source, sink).unwrap();
    let stats = bot.run(RunLimit::Cycles(3)).unwrap();
    assert_eq!(stats.cycles, 3);
    assert_eq!(stats.solves, 2);
    assert_eq!(stats.unchanged, 1);

    let (source, sink) = bot.into_parts();
    assert_eq!(source.served(), 3);
    let out = String::from_utf8(sink.into_inner()).unwrap();
    let lines: Vec<serde_json::Value> = out
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();

    // the third board is solved too; it is sent only if it has a plan
    assert_eq!(lines.len() as u64, stats.batches);
    let first = &lines[0];
    assert_eq!(first["type"], "actions");
    assert_eq!(first["batch"], 1);
    assert_eq!(first["score"], 29);
    let actions = first["actions"].as_array().unwrap();
    // three steps over, grab, four back, release; no walk home
    assert_eq!(actions.len(), 9);
    assert_eq!(actions[3]["action"], "grab");
    assert_eq!(actions[3]["key"], "space");
    assert_eq!(actions[3]["delay_ms"], 20);
    assert_eq!(actions[8]["action"], "release");
    assert_eq!(actions[8]["delay_ms"], 150);
}

#[test]
fn bot_once_stops_after_first_board() {
    let config = config();
    let source = TextBoardSource::from_text(VERTICAL_RUN, config.table().unwrap()).unwrap();
    let mut bot = Bot::new(&config, source, NullSink::default()).unwrap();
    let stats = bot.run(RunLimit::Once).unwrap();
    assert_eq!(stats.cycles, 1);
    assert_eq!(bot.sink().batches, 1);
}

#[test]
fn bot_step_reports_plan() {
    let config = config();
    let source = TextBoardSource::from_text(VERTICAL_RUN, config.table().unwrap()).unwrap();
    let mut bot = Bot::new(&config, source, NullSink::default()).unwrap();
    match bot.step().unwrap() {
        Cycle::Acted(plan) => assert_eq!(plan.releases(), 1),
        other => panic!("expected a plan, got {other:?}"),
    }
    assert_eq!(bot.step().unwrap(), Cycle::Unchanged);
}

#[test]
fn invalid_config_is_rejected() {
    let mut config = config();
    config.solver.solve_time_ms = 0;
    assert!(config.validate().is_err());

    let bad = BotConfig::from_toml_str("[scoring]\nchain_multipliers = [4, 2]\n").unwrap();
    assert!(bad.validate().is_err());

    let bad = BotConfig::from_toml_str("[keys]\nhold = \"x\"\n").unwrap();
    assert!(bad.validate().is_err());
}
