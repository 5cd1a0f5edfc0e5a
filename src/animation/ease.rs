/// Easing curves used to map normalized progress, named the way authored choreography names them
/// (`power1.out`, `expo.out`, ...).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Ease {
    /// Linear interpolation (`none`).
    #[serde(rename = "none")]
    Linear,
    #[serde(rename = "power1.in")]
    Power1In,
    /// Default ease for steps and tweens.
    #[default]
    #[serde(rename = "power1.out")]
    Power1Out,
    #[serde(rename = "power1.inOut")]
    Power1InOut,
    #[serde(rename = "power2.in")]
    Power2In,
    #[serde(rename = "power2.out")]
    Power2Out,
    #[serde(rename = "power2.inOut")]
    Power2InOut,
    #[serde(rename = "power3.in")]
    Power3In,
    #[serde(rename = "power3.out")]
    Power3Out,
    #[serde(rename = "power3.inOut")]
    Power3InOut,
    #[serde(rename = "power4.in")]
    Power4In,
    #[serde(rename = "power4.out")]
    Power4Out,
    #[serde(rename = "power4.inOut")]
    Power4InOut,
    /// Exponential ease-out; drives scrub catch-up.
    #[serde(rename = "expo.out")]
    ExpoOut,
    #[serde(rename = "sine.inOut")]
    SineInOut,
}

impl Ease {
    pub const ALL: [Ease; 15] = [
        Ease::Linear,
        Ease::Power1In,
        Ease::Power1Out,
        Ease::Power1InOut,
        Ease::Power2In,
        Ease::Power2Out,
        Ease::Power2InOut,
        Ease::Power3In,
        Ease::Power3Out,
        Ease::Power3InOut,
        Ease::Power4In,
        Ease::Power4Out,
        Ease::Power4InOut,
        Ease::ExpoOut,
        Ease::SineInOut,
    ];

    /// Apply this easing function to normalized progress `t` in `[0, 1]`.
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::Power1In => power_in(t, 2),
            Self::Power1Out => power_out(t, 2),
            Self::Power1InOut => power_in_out(t, 2),
            Self::Power2In => power_in(t, 3),
            Self::Power2Out => power_out(t, 3),
            Self::Power2InOut => power_in_out(t, 3),
            Self::Power3In => power_in(t, 4),
            Self::Power3Out => power_out(t, 4),
            Self::Power3InOut => power_in_out(t, 4),
            Self::Power4In => power_in(t, 5),
            Self::Power4Out => power_out(t, 5),
            Self::Power4InOut => power_in_out(t, 5),
            Self::ExpoOut => {
                if t >= 1.0 {
                    1.0
                } else {
                    1.0 - 2f64.powf(-10.0 * t)
                }
            }
            Self::SineInOut => -((std::f64::consts::PI * t).cos() - 1.0) / 2.0,
        }
    }
}

fn power_in(t: f64, n: i32) -> f64 {
    t.powi(n)
}

fn power_out(t: f64, n: i32) -> f64 {
    1.0 - (1.0 - t).powi(n)
}

fn power_in_out(t: f64, n: i32) -> f64 {
    if t < 0.5 {
        2f64.powi(n - 1) * t.powi(n)
    } else {
        1.0 - (-2.0 * t + 2.0).powi(n) / 2.0
    }
}

impl std::str::FromStr for Ease {
    type Err = crate::foundation::error::SkyscrollError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let quoted = serde_json::Value::String(s.trim().to_owned());
        serde_json::from_value(quoted)
            .map_err(|_| crate::foundation::error::SkyscrollError::parse(format!("unknown ease \"{s}\"")))
    }
}
