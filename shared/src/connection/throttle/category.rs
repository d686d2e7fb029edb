/// Traffic class an outbound packet is charged against.
///
/// The order matches the order of the seven rates in an `AgentThrottle`
/// block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ThrottleCategory {
    Resend,
    Land,
    Wind,
    Cloud,
    Task,
    Texture,
    Asset,
}

impl ThrottleCategory {
    pub const COUNT: usize = 7;

    pub const ALL: [ThrottleCategory; Self::COUNT] = [
        ThrottleCategory::Resend,
        ThrottleCategory::Land,
        ThrottleCategory::Wind,
        ThrottleCategory::Cloud,
        ThrottleCategory::Task,
        ThrottleCategory::Texture,
        ThrottleCategory::Asset,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            ThrottleCategory::Resend => "resend",
            ThrottleCategory::Land => "land",
            ThrottleCategory::Wind => "wind",
            ThrottleCategory::Cloud => "cloud",
            ThrottleCategory::Task => "task",
            ThrottleCategory::Texture => "texture",
            ThrottleCategory::Asset => "asset",
        }
    }
}
