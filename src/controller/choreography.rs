//! The day-to-night scroll choreography.

use super::nodes::SceneNodes;
use crate::animation::ease::Ease;
use crate::animation::timeline::{Timeline, TimelineBuilder};
use crate::animation::tween::Tween;
use crate::animation::value::Origin;
use crate::animation::vars::{Repeat, Vars};
use crate::foundation::color::Rgba;
use crate::foundation::error::SkyscrollResult;
use crate::scene::graph::SceneGraph;
use crate::engine::registry::{AnimationRegistry, TriggerId};
use crate::trigger::hooks::HookKind;
use crate::trigger::range::ScrollRange;
use crate::trigger::scrub::Scrub;

/// Parallax unit for scene 1 drift.
pub const SPEED: f64 = 100.0;
/// Authored scene height.
pub const HEIGHT: f64 = 500.0;
/// Viewports at most this wide start with the small clouds visible.
pub const NARROW_QUERY: &str = "(max-width: 1922px)";

/// Register every timeline, hook, loop and media rule of the scene, in authored order.
pub fn build(reg: &mut AnimationRegistry, scene: &mut SceneGraph, n: &SceneNodes) -> SkyscrollResult<()> {
    initial_state(reg, scene, n)?;
    scene1(reg, scene, n)?;
    bird(reg, scene, n)?;
    clouds(reg, scene, n)?;
    sun(reg, scene, n)?;
    scene2(reg, scene, n)?;
    bats(reg, scene, n)?;
    sun2(reg, scene, n)?;
    transition(reg, scene, n)?;
    scene3(reg, scene, n)?;
    falling_star(reg, scene, n)?;
    twinkle(reg, scene, n);
    Ok(())
}

fn scrolled(
    reg: &mut AnimationRegistry,
    scene: &mut SceneGraph,
    (start, end): (&str, &str),
    scrub: f64,
    timeline: Timeline,
) -> SkyscrollResult<TriggerId> {
    let range = ScrollRange::parse(start, end)?;
    Ok(reg.create_timeline(range, Scrub::secs(scrub), timeline, scene))
}

fn color(hex: &str) -> SkyscrollResult<Rgba> {
    Rgba::parse(hex)
}

fn initial_state(reg: &mut AnimationRegistry, scene: &mut SceneGraph, n: &SceneNodes) -> SkyscrollResult<()> {
    reg.set(n.hills2[0], &Vars::new().opacity(0.0), scene);
    reg.set(n.bg_grad, &Vars::new().attr("cy", -50.0), scene);
    reg.set(n.scene3, &Vars::new().y(HEIGHT - 40.0).visible(true), scene);

    let narrow = Vars::new().x(10.0).opacity(1.0);
    reg.add_media_rule(
        NARROW_QUERY.parse()?,
        n.cloud_start.iter().map(|&c| (c, narrow.clone())).collect(),
    );
    Ok(())
}

fn scene1(reg: &mut AnimationRegistry, scene: &mut SceneGraph, n: &SceneNodes) -> SkyscrollResult<()> {
    let h = n.hills1;
    let drift = |y: f64, x: f64| Vars::new().y(y * SPEED).x(x * SPEED);
    let tl = TimelineBuilder::new("scene1")
        .to(h[0], drift(3.0, 1.0).scale(0.9).ease(Ease::Power1In), 0.0)
        .to(h[1], drift(2.6, -0.6).ease(Ease::Power1In), 0.0)
        .to(h[2], drift(1.7, 1.2), 0.03)
        .to(h[3], drift(3.0, 1.0), 0.03)
        .to(h[4], drift(2.0, 1.0), 0.03)
        .to(h[5], drift(2.3, -2.5), 0.0)
        .to(h[6], drift(5.0, 1.6), 0.0)
        .to(h[7], drift(3.5, 0.2), 0.0)
        .to(h[8], drift(3.5, -0.2), 0.0)
        .to(n.clouds_big[0], drift(4.5, -0.2), 0.0)
        .to(n.clouds_big[1], drift(4.5, -0.2), 0.0)
        .to(n.cloud_start[0], Vars::new().x(-300.0), 0.0)
        .to(n.cloud_start[1], Vars::new().x(300.0), 0.0)
        .to(n.info, Vars::new().y(8.0 * SPEED), 0.0)
        .build();
    scrolled(reg, scene, ("top top", "45% 100%"), 3.0, tl)?;
    Ok(())
}

fn bird(reg: &mut AnimationRegistry, scene: &mut SceneGraph, n: &SceneNodes) -> SkyscrollResult<()> {
    let bird = n.bird;
    let tl = TimelineBuilder::new("bird")
        .from_to(
            bird,
            Vars::new().opacity(1.0),
            Vars::new().y(-250.0).x(800.0).ease(Ease::Power2Out),
            0.0,
        )
        .build();
    let id = scrolled(reg, scene, ("15% top", "60% 100%"), 4.0, tl)?;
    reg.on(id, HookKind::Enter, move |ctx| {
        ctx.to(bird, Vars::new().scale_x(1.0).rotation(0.0));
    });
    reg.on(id, HookKind::Leave, move |ctx| {
        ctx.to(bird, Vars::new().scale_x(-1.0).rotation(-15.0));
    });
    Ok(())
}

fn clouds(reg: &mut AnimationRegistry, scene: &mut SceneGraph, n: &SceneNodes) -> SkyscrollResult<()> {
    let [c1, c2, c3, c4] = n.clouds;
    let tl = TimelineBuilder::new("clouds")
        .to(c1, Vars::new().x(500.0), 0.0)
        .to(c2, Vars::new().x(1000.0), 0.0)
        .to(c3, Vars::new().x(-1000.0), 0.0)
        .to(c4, Vars::new().x(-700.0).y(25.0), 0.0)
        .build();
    scrolled(reg, scene, ("top top", "70% 100%"), 1.0, tl)?;
    Ok(())
}

fn sun(reg: &mut AnimationRegistry, scene: &mut SceneGraph, n: &SceneNodes) -> SkyscrollResult<()> {
    let s = n.bg_grad_stops;
    let offset = |v: f64| Vars::new().attr("offset", v);
    let tl = TimelineBuilder::new("sun")
        .from_to(
            n.bg_grad,
            Vars::new().attr("cy", -50.0),
            Vars::new().attr("cy", 330.0),
            0.0,
        )
        .to(s[0], offset(0.15), 0.0)
        .to(s[1], offset(0.18), 0.0)
        .to(s[2], offset(0.25), 0.0)
        .to(s[3], offset(0.46), 0.0)
        .to(s[4], Vars::new().attr_color("stop-color", color("#FF9171")?), 0.0)
        .build();
    scrolled(reg, scene, ("1% top", "2150 100%"), 2.0, tl)?;
    Ok(())
}

fn scene2(reg: &mut AnimationRegistry, scene: &mut SceneGraph, n: &SceneNodes) -> SkyscrollResult<()> {
    let h = n.hills2;
    let rise = |from: f64| (Vars::new().y(from), Vars::new().y(0.0));
    let mut tl = TimelineBuilder::new("scene2").from_to(
        h[0],
        Vars::new().y(500.0).opacity(0.0),
        Vars::new().y(0.0).opacity(1.0),
        0.0,
    );
    for (node, from, at) in [
        (h[1], 500.0, 0.1),
        (h[2], 700.0, 0.1),
        (h[3], 700.0, 0.2),
        (h[4], 800.0, 0.3),
        (h[5], 900.0, 0.3),
    ] {
        let (from, to) = rise(from);
        tl = tl.from_to(node, from, to, at);
    }
    scrolled(reg, scene, ("15% top", "40% 100%"), 3.0, tl.build())?;
    Ok(())
}

fn bats(reg: &mut AnimationRegistry, scene: &mut SceneGraph, n: &SceneNodes) -> SkyscrollResult<()> {
    let bats = n.bats;
    let center = Origin::percent(50.0, 50.0);
    reg.set(bats, &Vars::new().origin(center), scene);
    let tl = TimelineBuilder::new("bats")
        .from_to(
            bats,
            Vars::new().opacity(1.0).y(400.0).scale(0.0),
            Vars::new().y(20.0).scale(0.8).ease(Ease::Power3Out),
            0.0,
        )
        .build();
    let id = scrolled(reg, scene, ("40% top", "70% 100%"), 3.0, tl)?;

    let wings = n.bat_wings.clone();
    reg.on(id, HookKind::Enter, move |ctx| {
        for (i, &wing) in wings.iter().enumerate() {
            ctx.to(
                wing,
                Vars::new()
                    .scale_x(0.5)
                    .yoyo(true)
                    .repeat(Repeat::Count(9))
                    .origin(center)
                    .duration(0.15)
                    .delay(0.7 + i as f64 / 10.0),
            );
        }
        ctx.set(bats, &Vars::new().opacity(1.0));
    });
    Ok(())
}

fn sun2(reg: &mut AnimationRegistry, scene: &mut SceneGraph, n: &SceneNodes) -> SkyscrollResult<()> {
    let stop_color = |hex: &str| -> SkyscrollResult<Vars> {
        Ok(Vars::new().attr_color("stop-color", color(hex)?))
    };
    let tl = TimelineBuilder::new("sun2")
        .to(n.sun, Vars::new().attr("offset", 1.4), 0.0)
        .to(n.bg_grad_stops[0], Vars::new().attr("offset", 0.7), 0.0)
        .to(n.sun, stop_color("#ffff00")?, 0.0)
        .to(n.lg4_stops[0], stop_color("#623951")?, 0.0)
        .to(n.lg4_stops[1], stop_color("#261F36")?, 0.0)
        .to(n.bg_grad_stops[4], stop_color("#45224A")?, 0.0)
        .build();
    scrolled(reg, scene, ("2000 top", "5000 100%"), 2.0, tl)?;
    Ok(())
}

fn transition(reg: &mut AnimationRegistry, scene: &mut SceneGraph, n: &SceneNodes) -> SkyscrollResult<()> {
    let tl = TimelineBuilder::new("transition")
        .to(
            n.hills2[0],
            Vars::new()
                .y(-HEIGHT - 100.0)
                .scale(1.5)
                .origin(Origin::percent(50.0, 50.0)),
            0.0,
        )
        .to(n.bg_grad, Vars::new().attr("cy", -80.0), 0.0)
        .to(n.bg2, Vars::new().y(0.0), 0.0)
        .build();
    scrolled(reg, scene, ("60% top", "bottom 100%"), 3.0, tl)?;
    Ok(())
}

fn scene3(reg: &mut AnimationRegistry, scene: &mut SceneGraph, n: &SceneNodes) -> SkyscrollResult<()> {
    let mut tl = TimelineBuilder::new("scene3");
    for (i, (&hill, from)) in n
        .hills3
        .iter()
        .zip([300.0, 800.0, 600.0, 800.0, 1000.0])
        .enumerate()
    {
        tl = tl.from_to(hill, Vars::new().y(from), Vars::new().y(-550.0), 0.03 * i as f64);
    }
    let fade_in = |to: f64, y: f64| (Vars::new().opacity(0.0), Vars::new().opacity(to).y(y));
    let (from, to) = fade_in(0.5, -500.0);
    tl = tl.from_to(n.stars, from, to, 0.0);
    let (from, to) = fade_in(0.7, -710.0);
    tl = tl.from_to(n.arrow2, from, to, 0.25);
    let (from, to) = fade_in(0.7, -710.0);
    let tl = tl
        .from_to(n.text2, from, to, 0.3)
        .to(n.bg2_grad, Vars::new().attr("cy", 600.0), 0.0)
        .to(n.bg2_grad, Vars::new().attr("r", 500.0), 0.0)
        .build();
    scrolled(reg, scene, ("70% 50%", "bottom 100%"), 3.0, tl)?;
    Ok(())
}

fn falling_star(reg: &mut AnimationRegistry, scene: &mut SceneGraph, n: &SceneNodes) -> SkyscrollResult<()> {
    let fstar = n.fstar;
    reg.set(fstar, &Vars::new().y(-400.0), scene);
    let tl = TimelineBuilder::new("fstar")
        .to(fstar, Vars::new().x(-700.0).y(-250.0).ease(Ease::Power2Out), 0.0)
        .build();
    let id = scrolled(reg, scene, ("4200 top", "6000 bottom"), 2.0, tl)?;
    reg.on(id, HookKind::Enter, move |ctx| ctx.set(fstar, &Vars::new().opacity(1.0)));
    reg.on(id, HookKind::Leave, move |ctx| ctx.set(fstar, &Vars::new().opacity(0.0)));
    Ok(())
}

fn twinkle(reg: &mut AnimationRegistry, scene: &mut SceneGraph, n: &SceneNodes) {
    for star in &n.twinkle {
        let tween = Tween::from_to(
            star.node,
            Vars::new().opacity(0.3),
            Vars::new()
                .opacity(1.0)
                .duration(0.3)
                .repeat(Repeat::Infinite)
                .repeat_delay(star.repeat_delay),
        );
        reg.create_loop(tween, scene);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::value::Prop;
    use crate::page::DAYBREAK_SCENE;
    use crate::viewport::Viewport;

    fn built() -> (AnimationRegistry, SceneGraph, SceneNodes) {
        let mut scene = SceneGraph::from_json(DAYBREAK_SCENE).unwrap();
        let nodes = SceneNodes::resolve(&scene).unwrap();
        let mut reg = AnimationRegistry::new();
        build(&mut reg, &mut scene, &nodes).unwrap();
        (reg, scene, nodes)
    }

    #[test]
    fn registers_every_section() {
        let (reg, _, _) = built();
        let names: Vec<_> = reg.triggers().map(|(_, t)| t.name().to_owned()).collect();
        assert_eq!(
            names,
            ["scene1", "bird", "clouds", "sun", "scene2", "bats", "sun2", "transition", "scene3", "fstar"]
        );
        let stats = reg.stats();
        assert_eq!(stats.hooks, 5);
        assert_eq!(stats.loops, 15);
        assert_eq!(stats.media_rules, 1);
        assert_eq!(stats.tweens, 0);
    }

    #[test]
    fn explicit_starts_render_at_registration() {
        let (_, scene, n) = built();
        let y = |id| scene.get(id, &Prop::Y).as_number().unwrap();
        assert_eq!(y(n.scene3), HEIGHT - 40.0);
        assert_eq!(y(n.hills2[5]), 900.0);
        assert_eq!(y(n.hills3[4]), 1000.0);
        assert_eq!(y(n.fstar), -400.0);
        assert_eq!(scene.get(n.bats, &Prop::ScaleX).as_number(), Some(0.0));
        assert_eq!(scene.get(n.stars, &Prop::Opacity).as_number(), Some(0.0));
        assert_eq!(scene.get(n.bg_grad, &Prop::attr("cy")).as_number(), Some(-50.0));
    }

    #[test]
    fn scrub_factors_and_ranges_match_authoring() {
        let (mut reg, mut scene, _) = built();
        reg.refresh(&Viewport::default(), &mut scene).unwrap();
        let bird = reg.find_trigger("bird").unwrap();
        assert_eq!(bird.scrub(), Scrub::Smooth(4.0));
        let r = bird.resolved().unwrap();
        assert_eq!((r.start, r.end), (900.0, 2700.0));
        let fstar = reg.find_trigger("fstar").unwrap().resolved().unwrap();
        assert_eq!((fstar.start, fstar.end), (4200.0, 5100.0));
        let sun = reg.find_trigger("sun").unwrap().resolved().unwrap();
        assert_eq!((sun.start, sun.end), (60.0, 1250.0));
    }
}
