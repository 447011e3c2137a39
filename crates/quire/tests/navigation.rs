//! Form and group navigation driven end to end through the simulator.

use quire::runtime::BatchMsg;
use quire::{
    Bound, Cmd, Field, Form, FormConfig, FormState, Group, KeyMsg, KeyType, Layout,
    Message, Model, MultiSelect, Select, SelectOption, Simulator, Text, UpdateFieldMsg,
    new_options, validate_required,
};

/// Routes the crate's `tracing` output to the test harness. Set `RUST_LOG=quire=debug`
/// to see navigation and evaluation events.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn press(sim: &mut Simulator<Form>, key: KeyMsg) {
    sim.send_key(key);
    sim.run_until_empty();
}

fn type_text(sim: &mut Simulator<Form>, text: &str) {
    press(sim, KeyMsg::from_runes(text.chars().collect()));
}

fn enter() -> KeyMsg {
    KeyMsg::from_type(KeyType::Enter)
}

/// Runs a command and everything it batches, returning the final messages.
fn drain(cmd: Option<Cmd>) -> Vec<Message> {
    let mut out = Vec::new();
    let Some(msg) = cmd.and_then(Cmd::execute) else {
        return out;
    };
    if msg.is::<BatchMsg>() {
        if let Some(BatchMsg(cmds)) = msg.downcast() {
            for cmd in cmds {
                out.extend(drain(Some(cmd)));
            }
        }
    } else {
        out.push(msg);
    }
    out
}

mod gating {
    use super::*;

    struct Scenario {
        sim: Simulator<Form>,
        w1: Bound<String>,
        w2: Bound<String>,
        w3: Bound<String>,
    }

    fn two_groups() -> Scenario {
        init_tracing();
        let w1 = Bound::new(String::new());
        let w2 = Bound::new(String::new());
        let w3 = Bound::new(String::new());
        let form = Form::new(vec![
            Group::new(vec![
                Box::new(Text::new().key("w1").title("W1").value(w1.clone())),
                Box::new(
                    Text::new()
                        .key("w2")
                        .title("W2")
                        .validate(validate_required("w2"))
                        .value(w2.clone()),
                ),
            ]),
            Group::new(vec![Box::new(
                Text::new().key("w3").title("W3").value(w3.clone()),
            )]),
        ]);
        let mut sim = Simulator::new(form);
        sim.init();
        sim.run_until_empty();
        Scenario { sim, w1, w2, w3 }
    }

    fn position(sim: &Simulator<Form>) -> (usize, usize) {
        let form = sim.model();
        let group = form.current_group();
        (group, form.groups()[group].current())
    }

    #[test]
    fn test_invalid_field_blocks_advance_until_fixed() {
        let Scenario {
            mut sim, w1, w2, w3,
        } = two_groups();
        assert_eq!(position(&sim), (0, 0));

        type_text(&mut sim, "one");
        press(&mut sim, enter());
        assert_eq!(position(&sim), (0, 1));
        assert_eq!(w1.get(), "one");

        // W2 is empty and required: Advance is refused, the error shows.
        press(&mut sim, enter());
        assert_eq!(position(&sim), (0, 1));
        assert_eq!(sim.model().errors(), vec!["w2 is required"]);
        assert!(sim.last_view().unwrap_or_default().contains("w2 is required"));

        // Fix W2, then Advance crosses into the next group.
        type_text(&mut sim, "two");
        assert!(sim.model().errors().is_empty());
        press(&mut sim, enter());
        assert_eq!(position(&sim), (1, 0));
        assert_eq!(w2.get(), "two");

        type_text(&mut sim, "three");
        press(&mut sim, enter());
        assert_eq!(sim.model().state(), FormState::Completed);
        assert!(sim.is_quit());
        assert_eq!(w3.get(), "three");
        assert_eq!(sim.model().get_string("w3").as_deref(), Some("three"));
    }

    #[test]
    fn test_retreat_returns_to_last_field_of_previous_group() {
        let Scenario { mut sim, w3, .. } = two_groups();
        press(&mut sim, enter());
        type_text(&mut sim, "fixed");
        press(&mut sim, enter());
        assert_eq!(position(&sim), (1, 0));

        type_text(&mut sim, "draft");
        press(&mut sim, KeyMsg::from_type(KeyType::ShiftTab));
        assert_eq!(position(&sim), (0, 1));
        // Retreat commits too.
        assert_eq!(w3.get(), "draft");

        // Retreat again stays inside the group.
        press(&mut sim, KeyMsg::from_type(KeyType::ShiftTab));
        assert_eq!(position(&sim), (0, 0));
        // Nothing before the first field of the first group.
        press(&mut sim, KeyMsg::from_type(KeyType::ShiftTab));
        assert_eq!(position(&sim), (0, 0));
        assert_eq!(sim.model().state(), FormState::Normal);
    }

    #[test]
    fn test_form_never_completes_with_errors() {
        let Scenario { mut sim, .. } = two_groups();
        for _ in 0..5 {
            press(&mut sim, enter());
        }
        assert_eq!(sim.model().state(), FormState::Normal);
        assert_eq!(position(&sim), (0, 1));
    }

    #[test]
    fn test_error_on_other_field_holds_group() {
        init_tracing();
        let ready = Bound::new(true);
        let r = ready.clone();
        let form = Form::new(vec![
            Group::new(vec![
                Box::new(Text::new().key("a").validate(move |_: &str| {
                    (!r.get()).then(|| "a depends on c".to_string())
                })),
                Box::new(Text::new().key("b")),
                Box::new(Text::new().key("c")),
            ]),
            Group::new(vec![Box::new(Text::new().key("d"))]),
        ]);
        let mut sim = Simulator::new(form);
        sim.init();
        sim.run_until_empty();

        press(&mut sim, enter());
        press(&mut sim, enter());
        assert_eq!(position(&sim), (0, 2));

        // Leaving the group re-validates every field; "a" now fails.
        ready.set(false);
        press(&mut sim, enter());
        assert_eq!(position(&sim), (0, 2));
        assert_eq!(sim.model().errors(), vec!["a depends on c"]);

        press(&mut sim, KeyMsg::from_type(KeyType::ShiftTab));
        assert_eq!(position(&sim), (0, 1));
        for _ in 0..3 {
            press(&mut sim, enter());
            assert_eq!(position(&sim), (0, 1));
        }
        assert_eq!(sim.model().state(), FormState::Normal);
    }

    #[test]
    fn test_ctrl_c_aborts() {
        let Scenario { mut sim, .. } = two_groups();
        press(&mut sim, KeyMsg::from_type(KeyType::CtrlC));
        assert_eq!(sim.model().state(), FormState::Aborted);
        assert!(sim.is_quit());
    }
}

mod multiselect {
    use super::*;

    #[test]
    fn test_limit_two_of_three() {
        let picked = Bound::new(Vec::new());
        let form = Form::new(vec![Group::new(vec![Box::new(
            MultiSelect::new()
                .title("Letters")
                .options(new_options(["A", "B", "C"]))
                .limit(2)
                .value(picked.clone()),
        )])]);
        let mut sim = Simulator::new(form);
        sim.init();

        press(&mut sim, KeyMsg::from_char('x'));
        press(&mut sim, KeyMsg::from_char('j'));
        press(&mut sim, KeyMsg::from_char('x'));
        press(&mut sim, KeyMsg::from_char('j'));
        press(&mut sim, KeyMsg::from_char('x'));
        assert!(
            sim.last_view()
                .unwrap_or_default()
                .contains("you can't select more than 2 options")
        );
        // The notice is not a validation error.
        assert!(sim.model().errors().is_empty());

        press(&mut sim, enter());
        assert_eq!(sim.model().state(), FormState::Completed);
        assert_eq!(picked.get(), vec!["A".to_string(), "B".to_string()]);
    }

    #[test]
    fn test_filter_then_toggle_commits_in_option_order() {
        let picked = Bound::new(Vec::new());
        let form = Form::new(vec![Group::new(vec![Box::new(
            MultiSelect::new()
                .options(new_options(["Apple", "Banana", "Cherry"]))
                .value(picked.clone()),
        )])]);
        let mut sim = Simulator::new(form);
        sim.init();

        press(&mut sim, KeyMsg::from_char('G'));
        press(&mut sim, KeyMsg::from_char('x'));
        press(&mut sim, KeyMsg::from_char('/'));
        type_text(&mut sim, "an");
        press(&mut sim, enter());
        press(&mut sim, KeyMsg::from_char('x'));
        press(&mut sim, KeyMsg::from_type(KeyType::Esc));
        press(&mut sim, enter());

        assert_eq!(sim.model().state(), FormState::Completed);
        assert_eq!(picked.get(), vec!["Banana".to_string(), "Cherry".to_string()]);
    }

    #[test]
    fn test_dependent_options_follow_earlier_answer() {
        let country = Bound::new("Canada".to_string());
        let cities = Bound::new(Vec::new());
        let c = country.clone();
        let form = Form::new(vec![
            Group::new(vec![Box::new(
                Select::new()
                    .title("Country")
                    .options(new_options(["Canada", "France"]))
                    .value(country.clone()),
            )]),
            Group::new(vec![Box::new(
                MultiSelect::new()
                    .title_func(
                        {
                            let c = country.clone();
                            move || format!("Cities in {}", c.get())
                        },
                        country.clone(),
                    )
                    .options_func(
                        move || match c.get().as_str() {
                            "France" => new_options(["Paris", "Lyon"]),
                            _ => new_options(["Toronto", "Montreal"]),
                        },
                        country.clone(),
                    )
                    .value(cities.clone()),
            )]),
        ]);
        let mut sim = Simulator::new(form);
        sim.init();
        sim.run_until_empty();

        press(&mut sim, KeyMsg::from_char('j'));
        press(&mut sim, enter());
        assert_eq!(country.get(), "France");
        assert_eq!(sim.model().current_group(), 1);

        let view = sim.last_view().unwrap_or_default().to_string();
        assert!(view.contains("Cities in France"));
        assert!(view.contains("Paris"));
        assert!(!view.contains("Toronto"));

        press(&mut sim, KeyMsg::from_char('x'));
        press(&mut sim, enter());
        assert_eq!(cities.get(), vec!["Paris".to_string()]);
    }

    #[test]
    fn test_stale_options_are_discarded() {
        init_tracing();
        let country = Bound::new("Canada".to_string());
        let c = country.clone();
        let mut form = Form::new(vec![Group::new(vec![Box::new(
            MultiSelect::<String>::new().options_func(
                move || match c.get().as_str() {
                    "France" => new_options(["Paris"]),
                    _ => new_options(["Toronto"]),
                },
                country.clone(),
            ),
        )])]);

        let slow = form.update(Message::new(UpdateFieldMsg));
        country.set("France".to_string());
        let fast = form.update(Message::new(UpdateFieldMsg));

        // The newer computation lands first, the older one afterwards.
        for msg in drain(fast) {
            form.update(msg);
        }
        for msg in drain(slow) {
            form.update(msg);
        }

        let view = form.view();
        assert!(view.contains("Paris"));
        assert!(!view.contains("Toronto"));
    }
}

mod layout {
    use super::*;

    fn tall_select(title: &str) -> Box<dyn Field> {
        Box::new(
            Select::new()
                .title(title)
                .options(new_options(["one", "two", "three", "four"])),
        )
    }

    #[test]
    fn test_group_viewport_follows_focus() {
        let form = Form::new(vec![Group::new(vec![
            tall_select("First"),
            tall_select("Second"),
            tall_select("Third"),
        ])])
        .height(6);
        let mut sim = Simulator::new(form);
        sim.init();

        for _ in 0..2 {
            press(&mut sim, enter());
            let form = sim.model();
            let group = &form.groups()[0];
            let (start, end) = group.field_bounds(group.current()).unwrap_or_default();
            assert!(group.offset() <= start);
            assert!(end <= group.offset() + group.viewport_height());
        }
        assert!(sim.last_view().unwrap_or_default().contains("Third"));
        assert!(!sim.last_view().unwrap_or_default().contains("First"));
    }

    #[test]
    fn test_config_threads_into_groups() {
        let config = FormConfig::from_toml_str("height = 4\nshow_help = false\nlayout = \"stack\"")
            .unwrap();
        let form = Form::new(vec![
            Group::new(vec![tall_select("Alpha")]),
            Group::new(vec![tall_select("Beta")]),
        ])
        .with_config(config);
        assert_eq!(form.groups()[0].viewport_height(), 4);
        assert_eq!(form.config().layout, Layout::Stack);
        let view = form.view();
        assert!(view.contains("Alpha"));
        assert!(view.contains("Beta"));
        assert!(!view.contains("submit"));
    }
}

mod accessible {
    use super::*;

    #[test]
    fn test_accessible_run_commits_same_values() {
        let letters = Bound::new(Vec::new());
        let size = Bound::new(0u8);
        let bio = Bound::new(String::new());
        let mut form = Form::new(vec![
            Group::new(vec![
                Box::new(
                    MultiSelect::new()
                        .title("Letters")
                        .options(new_options(["A", "B", "C"]))
                        .limit(2)
                        .value(letters.clone()),
                ) as Box<dyn Field>,
                Box::new(
                    Select::new()
                        .title("Size")
                        .options(vec![SelectOption::new("S", 1), SelectOption::new("L", 2)])
                        .value(size.clone()),
                ),
            ]),
            Group::new(vec![Box::new(Text::new().title("Skipped"))]).hide(true),
            Group::new(vec![Box::new(
                Text::new()
                    .title("Bio")
                    .validate(validate_required("bio"))
                    .value(bio.clone()),
            )]),
        ]);

        let mut input = std::io::Cursor::new("3\n1\n2\n0\n5\n2\n\nHello\n");
        let mut output = Vec::new();
        form.run_accessible(&mut input, &mut output).unwrap();

        assert_eq!(form.state(), FormState::Completed);
        assert_eq!(letters.get(), vec!["A".to_string(), "C".to_string()]);
        assert_eq!(size.get(), 2);
        assert_eq!(bio.get(), "Hello");

        let out = String::from_utf8(output).unwrap();
        assert!(out.contains("you can't select more than 2 options"));
        assert!(out.contains("Invalid: must be a number between 1 and 2"));
        assert!(out.contains("bio is required"));
        assert!(!out.contains("Skipped"));
    }

    #[test]
    fn test_accessible_end_of_input_aborts() {
        let mut form = Form::new(vec![Group::new(vec![Box::new(Text::new().title("Name"))])]);
        let mut input = std::io::Cursor::new("");
        let mut output = Vec::new();
        let err = form.run_accessible(&mut input, &mut output).unwrap_err();
        assert!(err.is_user_abort());
        assert_eq!(form.state(), FormState::Aborted);
    }

    #[test]
    fn test_accessible_settles_dependent_options() {
        let country = Bound::new(String::new());
        let city = Bound::new(String::new());
        let c = country.clone();
        let mut form = Form::new(vec![
            Group::new(vec![Box::new(
                Select::new()
                    .title("Country")
                    .options(new_options(["Canada", "France"]))
                    .value(country.clone()),
            )]),
            Group::new(vec![Box::new(
                Select::new()
                    .title("City")
                    .options_func(
                        move || match c.get().as_str() {
                            "France" => new_options(["Paris", "Lyon"]),
                            _ => new_options(["Toronto"]),
                        },
                        country.clone(),
                    )
                    .value(city.clone()),
            )]),
        ]);
        let mut input = std::io::Cursor::new("2\n2\n");
        let mut output = Vec::new();
        form.run_accessible(&mut input, &mut output).unwrap();
        assert_eq!(country.get(), "France");
        assert_eq!(city.get(), "Lyon");
    }
}
