use skyscroll::{NodeId, Page, Prop, PropValue, Rgba, SceneGraph, Viewport};

fn num(scene: &SceneGraph, id: &str, prop: Prop) -> f64 {
    let node: NodeId = scene.require(id).unwrap();
    scene.get(node, &prop).as_number().unwrap()
}

fn mounted() -> Page {
    let mut p = Page::daybreak(Viewport::default()).unwrap();
    p.mount().unwrap();
    p
}

fn progress(p: &Page, name: &str) -> f64 {
    p.controller().registry().find_trigger(name).unwrap().progress()
}

#[test]
fn top_of_page_shows_the_opening_scene() {
    let p = mounted();
    let s = p.scene();
    assert_eq!(num(s, "h1-1", Prop::Y), 0.0);
    assert_eq!(num(s, "h1-1", Prop::X), 0.0);
    assert_eq!(num(s, "scene3", Prop::Y), 460.0);
    assert_eq!(s.get(s.require("scene3").unwrap(), &Prop::Visibility), PropValue::Visible(true));
    assert_eq!(num(s, "stars", Prop::Opacity), 0.0);
    assert_eq!(num(s, "h2-1", Prop::Opacity), 0.0);
    assert_eq!(num(s, "h2-6", Prop::Y), 900.0);
    assert_eq!(num(s, "bg_grad", Prop::attr("cy")), -50.0);
    // Narrow-viewport rule.
    assert_eq!(num(s, "cloudStart-L", Prop::X), 10.0);
    assert_eq!(num(s, "cloudStart-R", Prop::Opacity), 1.0);
}

#[test]
fn forty_five_percent_finishes_scene_one() {
    let mut p = mounted();
    p.scroll_to_fraction(0.45);
    p.settle();
    assert_eq!(progress(&p, "scene1"), 1.0);
    assert!(progress(&p, "scene2") >= 0.5);

    let s = p.scene();
    assert_eq!(num(s, "h1-1", Prop::Y), 300.0);
    assert_eq!(num(s, "h1-1", Prop::X), 100.0);
    assert_eq!(num(s, "h1-1", Prop::ScaleX), 0.9);
    assert_eq!(num(s, "info", Prop::Y), 800.0);
    assert_eq!(num(s, "cloudStart-L", Prop::X), -300.0);
    assert_eq!(num(s, "h2-2", Prop::Y), 0.0);
    assert_eq!(num(s, "h2-1", Prop::Opacity), 1.0);
    assert_eq!(num(s, "bg_grad", Prop::attr("cy")), 330.0);
}

#[test]
fn sunrise_colors_settle_before_dusk_begins() {
    let mut p = mounted();
    p.scroll_to(1500.0);
    p.settle();
    assert_eq!(progress(&p, "sun"), 1.0);
    assert_eq!(progress(&p, "sun2"), 0.0);

    let s = p.scene();
    let stop6 = s.nth_child(s.require("bg_grad").unwrap(), 6).unwrap();
    assert_eq!(
        s.get(stop6, &Prop::attr("stop-color")).as_color(),
        Some(Rgba::parse("#FF9171").unwrap())
    );
}

#[test]
fn bottom_of_page_is_night() {
    let mut p = mounted();
    p.scroll_to_fraction(0.45);
    p.settle();
    p.scroll_to_fraction(1.0);
    p.settle();
    assert_eq!(progress(&p, "scene3"), 1.0);
    assert_eq!(progress(&p, "fstar"), 1.0);

    let s = p.scene();
    assert_eq!(num(s, "fstar", Prop::X), -700.0);
    assert_eq!(num(s, "fstar", Prop::Y), -250.0);
    assert_eq!(num(s, "h3-1", Prop::Y), -550.0);
    assert_eq!(num(s, "h3-5", Prop::Y), -550.0);
    assert_eq!(num(s, "stars", Prop::Opacity), 0.5);
    assert_eq!(num(s, "text2", Prop::Opacity), 0.7);
    assert_eq!(num(s, "h2-1", Prop::Y), -600.0);
    assert_eq!(num(s, "h2-1", Prop::ScaleX), 1.5);
    assert_eq!(num(s, "bg_grad", Prop::attr("cy")), -80.0);
    assert_eq!(num(s, "bg2", Prop::Y), 0.0);
    assert_eq!(num(s, "bg2-grad", Prop::attr("r")), 500.0);
    // The falling star has left its range.
    assert_eq!(num(s, "fstar", Prop::Opacity), 0.0);
}

#[test]
fn forward_scroll_never_rewinds_progress() {
    let mut p = mounted();
    let names: Vec<String> = p
        .controller()
        .registry()
        .triggers()
        .map(|(_, t)| t.name().to_owned())
        .collect();
    let mut last = vec![0.0; names.len()];
    for step in 0..=300 {
        p.scroll_to_fraction(f64::from(step) / 300.0);
        p.tick(1.0 / 60.0);
        for (name, prev) in names.iter().zip(last.iter_mut()) {
            let t = p.controller().registry().find_trigger(name).unwrap();
            assert!(t.progress() >= *prev, "{name} went back");
            assert!(t.raw_progress() >= t.progress() - 1e-12);
            *prev = t.progress();
        }
    }
}

#[test]
fn scrolling_back_to_top_restores_start_values() {
    let mut p = mounted();
    let start = p.snapshot().nodes;
    p.scroll_to_fraction(0.4);
    p.settle();
    p.scroll_to(0.0);
    p.settle();

    let s = p.scene();
    assert_eq!(num(s, "h1-1", Prop::Y), 0.0);
    assert_eq!(num(s, "h2-6", Prop::Y), 900.0);
    assert_eq!(num(s, "bg_grad", Prop::attr("cy")), -50.0);
    let back = p.snapshot().nodes;
    let by_id = |nodes: &[skyscroll::scene::graph::NodeSnapshot], id: &str| {
        nodes.iter().find(|n| n.id == id).cloned().unwrap()
    };
    for id in ["h1-3", "cloud1", "clouds", "h2-3", "bats"] {
        assert_eq!(by_id(&back, id), by_id(&start, id), "{id}");
    }
}

#[test]
fn resize_refreshes_ranges() {
    let mut p = mounted();
    let before = p.controller().registry().find_trigger("scene1").unwrap().resolved().unwrap();
    p.resize(1280.0, 600.0).unwrap();
    let after = p.controller().registry().find_trigger("scene1").unwrap().resolved().unwrap();
    assert_eq!(before.end, 1800.0);
    assert_eq!(after.end, 2100.0);

    // Wide viewports drop the narrow-only cloud placement.
    p.resize(2560.0, 1440.0).unwrap();
    assert_eq!(num(p.scene(), "cloudStart-L", Prop::X), 0.0);
    assert_eq!(num(p.scene(), "cloudStart-L", Prop::Opacity), 0.0);
}

#[test]
fn bird_turns_around_when_it_leaves() {
    let mut p = mounted();
    let scale_and_turn = |p: &Page| {
        let s = p.scene();
        (num(s, "bird", Prop::ScaleX), num(s, "bird", Prop::Rotation))
    };

    p.scroll_to(1000.0);
    p.settle();
    assert_eq!(scale_and_turn(&p), (1.0, 0.0));

    p.scroll_to(2800.0);
    p.settle();
    assert_eq!(scale_and_turn(&p), (-1.0, -15.0));
}

#[test]
fn bat_wings_flutter_in_sequence_after_entering() {
    const DT: f64 = 1.0 / 60.0;
    let mut p = mounted();
    p.scroll_to(2000.0);
    p.settle();
    let wings = p.controller().nodes().unwrap().bat_wings.clone();
    assert!(wings.len() >= 2);

    p.scroll_to(2500.0);
    assert_eq!(num(p.scene(), "bats", Prop::Opacity), 1.0);

    let mut first_move = vec![None; wings.len()];
    let mut lowest = vec![1.0_f64; wings.len()];
    for frame in 1..=400 {
        p.tick(DT);
        for (i, &wing) in wings.iter().enumerate() {
            let sx = p.scene().get(wing, &Prop::ScaleX).as_number().unwrap();
            lowest[i] = lowest[i].min(sx);
            if sx != 1.0 && first_move[i].is_none() {
                first_move[i] = Some(f64::from(frame) * DT);
            }
        }
    }

    for (i, &wing) in wings.iter().enumerate() {
        let delay = 0.7 + i as f64 / 10.0;
        let started = first_move[i].unwrap();
        assert!((started - delay).abs() <= 2.0 * DT, "wing {i} started at {started}");
        assert!(lowest[i] < 0.55, "wing {i} only reached {}", lowest[i]);
        assert_eq!(p.scene().get(wing, &Prop::ScaleX).as_number(), Some(1.0));
    }
    assert!(p.controller().is_settled());
}
