use super::*;
use std::{
    collections::{HashMap, VecDeque},
    sync::Mutex,
    thread,
};

use crossbeam_channel::{unbounded, Sender};

/// Engine double: records what it receives and shows scripted display text.
struct ScriptedEngine {
    display: Mutex<String>,
    responses: Mutex<HashMap<CommandCode, VecDeque<String>>>,
    sent: Mutex<Vec<CommandCode>>,
    modes: Mutex<Vec<Mode>>,
    notify_tx: Sender<DisplayChanged>,
    notify_rx: Receiver<DisplayChanged>,
}

impl ScriptedEngine {
    fn showing(display: &str) -> Arc<Self> {
        let (notify_tx, notify_rx) = unbounded();
        Arc::new(Self {
            display: Mutex::new(display.to_string()),
            responses: Mutex::new(HashMap::new()),
            sent: Mutex::new(Vec::new()),
            modes: Mutex::new(Vec::new()),
            notify_tx,
            notify_rx,
        })
    }

    /// Queues the display text shown after the next `code`.
    fn respond(&self, code: CommandCode, display: &str) {
        self.responses
            .lock()
            .expect("responses")
            .entry(code)
            .or_default()
            .push_back(display.to_string());
    }

    fn set_display(&self, display: &str) {
        *self.display.lock().expect("display") = display.to_string();
    }

    fn sent(&self) -> Vec<CommandCode> {
        self.sent.lock().expect("sent").clone()
    }

    fn modes(&self) -> Vec<Mode> {
        self.modes.lock().expect("modes").clone()
    }
}

impl EngineAdapter for ScriptedEngine {
    fn send_command(&self, code: CommandCode) -> Result<(), EngineError> {
        self.sent.lock().expect("sent").push(code);
        let next = self
            .responses
            .lock()
            .expect("responses")
            .get_mut(&code)
            .and_then(VecDeque::pop_front);
        if let Some(display) = next {
            self.set_display(&display);
        }
        Ok(())
    }

    fn display(&self) -> Result<String, EngineError> {
        Ok(self.display.lock().expect("display").clone())
    }

    fn set_mode(&self, mode: Mode) -> Result<(), EngineError> {
        self.modes.lock().expect("modes").push(mode);
        Ok(())
    }

    fn subscribe_display_changes(&self) -> Receiver<DisplayChanged> {
        self.notify_rx.clone()
    }
}

fn interaction(engine: &Arc<ScriptedEngine>) -> InteractionEngine<ScriptedEngine> {
    InteractionEngine::new(Arc::clone(engine), InteractionOptions::default()).expect("attach")
}

fn digit(value: u32) -> CommandCode {
    CommandCode::digit(value).expect("digit")
}

#[test]
fn add_then_equals_records_history() {
    let engine = ScriptedEngine::showing("7");
    let mut calc = interaction(&engine);

    calc.send_command(CommandCode::ADD).expect("add");
    assert_eq!(calc.expression(), "7 + ");

    engine.respond(digit(3), "3");
    calc.send_command(digit(3)).expect("digit");
    assert_eq!(calc.expression(), "7 + ");

    engine.respond(CommandCode::EQUALS, "10");
    calc.send_command(CommandCode::EQUALS).expect("equals");

    let head = calc.history().head().expect("history entry");
    assert_eq!(head.expression(), "7 + 3");
    assert_eq!(head.result(), "10");
    assert_eq!(calc.expression(), "");
    assert_eq!(calc.expression_state(), &ExpressionState::default());
    assert_eq!(calc.display(), "10");
}

#[test]
fn equals_without_pending_expression_is_not_forwarded() {
    let engine = ScriptedEngine::showing("42");
    let mut calc = interaction(&engine);

    calc.send_command(CommandCode::EQUALS).expect("equals");

    assert!(calc.history().is_empty());
    assert!(engine.sent().is_empty());
}

#[test]
fn consecutive_operators_use_current_display() {
    let engine = ScriptedEngine::showing("7");
    let mut calc = interaction(&engine);

    calc.send_command(CommandCode::ADD).expect("add");
    engine.respond(digit(3), "3");
    calc.send_command(digit(3)).expect("digit");
    engine.respond(CommandCode::MUL, "10");
    calc.send_command(CommandCode::MUL).expect("mul");
    assert_eq!(calc.expression(), "3 × ");
    assert_eq!(calc.expression_state().first_operand(), Some("3"));

    calc.send_command(CommandCode::SUB).expect("sub");
    assert_eq!(calc.expression(), "10 − ");
    assert_eq!(
        calc.expression_state().pending_operator(),
        Some(shared::protocol::BinaryOperator::Subtract)
    );
}

#[test]
fn prefix_survives_equals_unchanged() {
    let engine = ScriptedEngine::showing("1,000");
    let mut calc = interaction(&engine);

    calc.send_command(CommandCode::DIV).expect("div");
    engine.respond(digit(8), "8");
    calc.send_command(digit(8)).expect("digit");
    engine.respond(CommandCode::EQUALS, "125");
    calc.send_command(CommandCode::EQUALS).expect("equals");

    let head = calc.history().head().expect("entry");
    assert_eq!(head.expression(), "1,000 ÷ 8");
    assert_eq!(head.result(), "125");
}

#[test]
fn engine_error_text_is_recorded_like_any_result() {
    let engine = ScriptedEngine::showing("1");
    let mut calc = interaction(&engine);

    calc.send_command(CommandCode::DIV).expect("div");
    engine.respond(digit(0), "0");
    calc.send_command(digit(0)).expect("digit");
    engine.respond(CommandCode::EQUALS, "Cannot divide by zero");
    calc.send_command(CommandCode::EQUALS).expect("equals");

    let head = calc.history().head().expect("entry");
    assert_eq!(head.expression(), "1 ÷ 0");
    assert_eq!(head.result(), "Cannot divide by zero");
    assert!(!calc.is_bit_set(0));
}

#[test]
fn clear_and_clear_entry_reset_the_tracker_and_forward() {
    let engine = ScriptedEngine::showing("5");
    let mut calc = interaction(&engine);

    calc.send_command(CommandCode::ADD).expect("add");
    calc.send_command(CommandCode::CLEAR_ENTRY).expect("ce");
    assert_eq!(calc.expression(), "");

    calc.send_command(CommandCode::MUL).expect("mul");
    calc.send_command(CommandCode::CLEAR).expect("clear");
    assert_eq!(calc.expression(), "");

    assert_eq!(
        engine.sent(),
        vec![
            CommandCode::ADD,
            CommandCode::CLEAR_ENTRY,
            CommandCode::MUL,
            CommandCode::CLEAR
        ]
    );
}

#[test]
fn unknown_codes_pass_through_untouched() {
    let engine = ScriptedEngine::showing("0");
    let mut calc = interaction(&engine);

    calc.send_command(CommandCode(102)).expect("sin");
    calc.send_command(CommandCode::NEGATE).expect("negate");

    assert_eq!(engine.sent(), vec![CommandCode(102), CommandCode::NEGATE]);
    assert_eq!(calc.expression(), "");
}

#[test]
fn radix_switch_updates_record_and_forwards() {
    let engine = ScriptedEngine::showing("255");
    let mut calc = interaction(&engine);
    let events = calc.subscribe();

    engine.respond(CommandCode::RADIX_HEX, "FF");
    calc.send_command(CommandCode::RADIX_HEX).expect("hex");

    assert_eq!(calc.radix(), Radix::Hexadecimal);
    assert_eq!(engine.sent(), vec![CommandCode::RADIX_HEX]);
    let received: Vec<InteractionEvent> = events.try_iter().collect();
    assert_eq!(
        received,
        vec![
            InteractionEvent::DisplayChanged("FF".to_string()),
            InteractionEvent::RadixChanged(Radix::Hexadecimal),
        ]
    );
}

#[test]
fn mode_switch_code_routes_to_set_mode() {
    let engine = ScriptedEngine::showing("12.5");
    let mut calc = interaction(&engine);

    calc.send_command(CommandCode::MODE_PROGRAMMER)
        .expect("programmer");
    calc.set_mode(Mode::Scientific).expect("scientific");

    assert_eq!(engine.modes(), vec![Mode::Programmer, Mode::Scientific]);
    assert!(engine.sent().is_empty());
    assert_eq!(calc.mode(), Mode::Scientific);
    assert_eq!(calc.display(), "12.5");
}

#[test]
fn mode_switch_keeps_pending_expression() {
    let engine = ScriptedEngine::showing("9");
    let mut calc = interaction(&engine);

    calc.send_command(CommandCode::ADD).expect("add");
    calc.set_mode(Mode::Programmer).expect("mode");

    assert_eq!(calc.expression(), "9 + ");
}

#[test]
fn toggle_replays_sequence_and_restores_radix() {
    let engine = ScriptedEngine::showing("255");
    let mut calc = interaction(&engine);
    calc.set_mode(Mode::Programmer).expect("mode");
    engine.respond(CommandCode::RADIX_HEX, "FF");
    calc.send_command(CommandCode::RADIX_HEX).expect("hex");

    engine.respond(CommandCode::RADIX_DEC, "255");
    engine.respond(CommandCode::CLEAR, "0");
    engine.respond(CommandCode::RADIX_HEX, "FE");
    calc.toggle_bit(0).expect("toggle");

    assert_eq!(
        engine.sent(),
        vec![
            CommandCode::RADIX_HEX,
            CommandCode::RADIX_DEC,
            CommandCode::CLEAR,
            digit(2),
            digit(5),
            digit(4),
            CommandCode::RADIX_HEX,
        ]
    );
    assert_eq!(calc.radix(), Radix::Hexadecimal);
    assert_eq!(calc.display(), "FE");
    assert!(!calc.is_bit_set(0));
    assert!(calc.is_bit_set(1));
}

#[test]
fn toggle_resets_pending_expression() {
    let engine = ScriptedEngine::showing("6");
    let mut calc = interaction(&engine);

    calc.send_command(CommandCode::ADD).expect("add");
    calc.toggle_bit(0).expect("toggle");

    assert_eq!(calc.expression(), "");
}

#[test]
fn toggle_past_width_leaves_engine_alone() {
    let engine = ScriptedEngine::showing("1");
    let mut calc = interaction(&engine);

    calc.toggle_bit(64).expect("toggle");
    calc.toggle_bit(200).expect("toggle");

    assert!(engine.sent().is_empty());
}

#[test]
fn bits_outside_programmer_mode_read_the_decimal_display() {
    let engine = ScriptedEngine::showing("10");
    let mut calc = interaction(&engine);
    calc.set_mode(Mode::Programmer).expect("mode");
    calc.send_command(CommandCode::RADIX_BIN).expect("bin");
    assert!(calc.is_bit_set(1));
    assert!(!calc.is_bit_set(3));

    calc.set_mode(Mode::Standard).expect("mode");
    assert_eq!(calc.radix(), Radix::Binary);
    assert_eq!(calc.effective_radix(), Radix::Decimal);
    assert!(calc.is_bit_set(3));
    assert_eq!(calc.bit_pattern(), Some(10));
}

#[test]
fn notifications_from_another_thread_refresh_display() {
    let engine = ScriptedEngine::showing("0");
    let mut calc = interaction(&engine);

    let background = Arc::clone(&engine);
    thread::spawn(move || {
        background.set_display("1,234");
        background.notify_tx.send(DisplayChanged).expect("notify");
        background.notify_tx.send(DisplayChanged).expect("notify");
    })
    .join()
    .expect("join");

    assert_eq!(calc.display(), "0");
    assert_eq!(calc.pump_notifications().expect("pump"), 2);
    assert_eq!(calc.display(), "1,234");
    assert_eq!(calc.pump_notifications().expect("pump"), 0);
}

#[test]
fn pending_notifications_are_drained_before_next_command() {
    let engine = ScriptedEngine::showing("0");
    let mut calc = interaction(&engine);

    engine.set_display("8");
    engine.notify_tx.send(DisplayChanged).expect("notify");
    calc.send_command(CommandCode::MUL).expect("mul");

    assert_eq!(calc.expression(), "8 × ");
}

#[test]
fn history_clear_and_reentry() {
    let engine = ScriptedEngine::showing("2");
    let mut calc = interaction(&engine);
    let events = calc.subscribe();

    calc.send_command(CommandCode::SUB).expect("sub");
    engine.respond(digit(5), "5");
    calc.send_command(digit(5)).expect("digit");
    engine.respond(CommandCode::EQUALS, "-3");
    calc.send_command(CommandCode::EQUALS).expect("equals");

    let id = calc.history().head().expect("entry").id();
    assert!(events
        .try_iter()
        .any(|event| event == InteractionEvent::HistoryAdded(id)));

    assert!(calc.reenter_history(id).expect("reenter"));
    assert_eq!(
        &engine.sent()[3..],
        &[CommandCode::CLEAR, digit(3), CommandCode::NEGATE]
    );

    calc.clear_history();
    assert!(calc.history().is_empty());
    assert!(!calc.reenter_history(id).expect("reenter"));
    assert_eq!(events.try_recv(), Ok(InteractionEvent::HistoryCleared));
}

#[test]
fn reentry_uses_radix_the_result_was_shown_in() {
    let engine = ScriptedEngine::showing("0");
    let mut calc = interaction(&engine);
    calc.set_mode(Mode::Programmer).expect("mode");

    engine.respond(digit(9), "9");
    calc.send_command(digit(9)).expect("digit");
    calc.send_command(CommandCode::ADD).expect("add");
    engine.respond(digit(1), "1");
    calc.send_command(digit(1)).expect("digit");
    engine.respond(CommandCode::EQUALS, "10");
    calc.send_command(CommandCode::EQUALS).expect("equals");

    let item = calc.history().head().expect("entry");
    assert_eq!(item.radix(), Radix::Decimal);
    let id = item.id();

    engine.respond(CommandCode::RADIX_HEX, "A");
    calc.send_command(CommandCode::RADIX_HEX).expect("hex");
    let before = engine.sent().len();
    assert!(calc.reenter_history(id).expect("reenter"));
    assert_eq!(
        &engine.sent()[before..],
        &[
            CommandCode::RADIX_DEC,
            CommandCode::CLEAR,
            digit(1),
            digit(0),
            CommandCode::RADIX_HEX,
        ]
    );
    assert_eq!(calc.radix(), Radix::Hexadecimal);
}

#[test]
fn history_limit_is_applied() {
    let engine = ScriptedEngine::showing("1");
    let options = InteractionOptions {
        history_limit: Some(1),
        ..InteractionOptions::default()
    };
    let mut calc = InteractionEngine::new(Arc::clone(&engine), options).expect("attach");

    for _ in 0..3 {
        calc.send_command(CommandCode::ADD).expect("add");
        calc.send_command(CommandCode::EQUALS).expect("equals");
    }

    assert_eq!(calc.history().len(), 1);
}

#[test]
fn snapshot_serializes_state() {
    let engine = ScriptedEngine::showing("4");
    let mut calc = interaction(&engine);
    calc.send_command(CommandCode::ADD).expect("add");

    let json = serde_json::to_value(calc.snapshot()).expect("json");
    assert_eq!(json["display"], "4");
    assert_eq!(json["expression"], "4 + ");
    assert_eq!(json["mode"], "standard");
    assert_eq!(json["radix"], "decimal");
    assert_eq!(json["history"].as_array().map(Vec::len), Some(0));
}

#[test]
fn detached_engine_reports_unavailable() {
    let result = InteractionEngine::new(Arc::new(DetachedEngine), InteractionOptions::default());
    assert!(matches!(result, Err(EngineError::Unavailable(_))));
}

#[test]
fn works_through_a_trait_object() {
    let engine: Arc<dyn EngineAdapter> = ScriptedEngine::showing("3");
    let mut calc =
        InteractionEngine::new(engine, InteractionOptions::default()).expect("attach");
    calc.send_command(CommandCode::ADD).expect("add");
    assert_eq!(calc.expression(), "3 + ");
}
