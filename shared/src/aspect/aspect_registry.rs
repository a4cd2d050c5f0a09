use crate::aspect::aspect::{Aspect, AspectFlags, AspectMask, NUM_ASPECTS};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AspectInfo {
    pub name: String,
    pub flags: AspectFlags,
}

/// Names and flags of the aspects a game declares
pub struct AspectRegistry {
    aspects: Vec<Option<AspectInfo>>,
}

impl AspectRegistry {
    pub fn new() -> Self {
        Self {
            aspects: vec![None; NUM_ASPECTS],
        }
    }

    pub fn declare(&mut self, aspect: Aspect, name: &str, flags: AspectFlags) {
        self.aspects[aspect.index()] = Some(AspectInfo {
            name: name.to_string(),
            flags,
        });
    }

    /// Declares the standard engine aspect table
    pub fn declare_default_aspects(&mut self) {
        let delegatable = AspectFlags::DELEGATABLE;
        self.declare(Aspect::SCRIPT, "Script", AspectFlags::NONE);
        self.declare(
            Aspect::PHYSICS,
            "Physics",
            AspectFlags::DELEGATABLE
                | AspectFlags::SERVER_MANAGED_PROFILE
                | AspectFlags::TIMESTAMP_STATE,
        );
        self.declare(Aspect::GAME_CLIENT_STATIC, "GameClientStatic", delegatable);
        self.declare(
            Aspect::GAME_SERVER_STATIC,
            "GameServerStatic",
            AspectFlags::SERVER_MANAGED_PROFILE,
        );
        self.declare(Aspect::GAME_CLIENT_DYNAMIC, "GameClientDynamic", delegatable);
        self.declare(Aspect::GAME_SERVER_DYNAMIC, "GameServerDynamic", AspectFlags::NONE);

        let client_aspects = [
            (Aspect::GAME_CLIENT_A, "GameClientA"),
            (Aspect::GAME_CLIENT_B, "GameClientB"),
            (Aspect::GAME_CLIENT_C, "GameClientC"),
            (Aspect::GAME_CLIENT_D, "GameClientD"),
            (Aspect::GAME_CLIENT_E, "GameClientE"),
            (Aspect::GAME_CLIENT_F, "GameClientF"),
            (Aspect::GAME_CLIENT_G, "GameClientG"),
            (Aspect::GAME_CLIENT_H, "GameClientH"),
            (Aspect::GAME_CLIENT_I, "GameClientI"),
            (Aspect::GAME_CLIENT_J, "GameClientJ"),
            (Aspect::GAME_CLIENT_K, "GameClientK"),
            (Aspect::GAME_CLIENT_L, "GameClientL"),
            (Aspect::GAME_CLIENT_M, "GameClientM"),
            (Aspect::GAME_CLIENT_O, "GameClientO"),
            (Aspect::GAME_CLIENT_P, "GameClientP"),
        ];
        for (aspect, name) in client_aspects {
            self.declare(aspect, name, delegatable);
        }
        self.declare(
            Aspect::GAME_CLIENT_N,
            "GameClientN",
            delegatable | AspectFlags::SERVER_CONTROLLER_ONLY,
        );

        let server_aspects = [
            (Aspect::GAME_SERVER_A, "GameServerA"),
            (Aspect::GAME_SERVER_B, "GameServerB"),
            (Aspect::GAME_SERVER_C, "GameServerC"),
            (Aspect::GAME_SERVER_D, "GameServerD"),
            (Aspect::GAME_SERVER_E, "GameServerE"),
        ];
        for (aspect, name) in server_aspects {
            self.declare(aspect, name, AspectFlags::NONE);
        }

        self.declare(Aspect::PLAYER_UPDATE, "PlayerUpdate", delegatable);
    }

    pub fn info(&self, aspect: Aspect) -> Option<&AspectInfo> {
        self.aspects[aspect.index()].as_ref()
    }

    pub fn name(&self, aspect: Aspect) -> Option<&str> {
        self.info(aspect).map(|info| info.name.as_str())
    }

    pub fn flags(&self, aspect: Aspect) -> AspectFlags {
        self.info(aspect)
            .map(|info| info.flags)
            .unwrap_or(AspectFlags::NONE)
    }

    pub fn declared(&self) -> AspectMask {
        self.mask_where(|_| true)
    }

    pub fn delegatable_aspects(&self) -> AspectMask {
        self.mask_where(|flags| flags.contains(AspectFlags::DELEGATABLE))
    }

    pub fn server_controller_only_aspects(&self) -> AspectMask {
        self.mask_where(|flags| flags.contains(AspectFlags::SERVER_CONTROLLER_ONLY))
    }

    pub fn server_managed_profile_aspects(&self) -> AspectMask {
        self.mask_where(|flags| flags.contains(AspectFlags::SERVER_MANAGED_PROFILE))
    }

    pub fn timestamped_aspects(&self) -> AspectMask {
        self.mask_where(|flags| flags.contains(AspectFlags::TIMESTAMP_STATE))
    }

    fn mask_where<F: Fn(AspectFlags) -> bool>(&self, predicate: F) -> AspectMask {
        let mut mask = AspectMask::EMPTY;
        for (index, info) in self.aspects.iter().enumerate() {
            if let Some(info) = info {
                if predicate(info.flags) {
                    if let Some(aspect) = Aspect::new(index as u8) {
                        mask.insert(aspect);
                    }
                }
            }
        }
        mask
    }
}

impl Default for AspectRegistry {
    fn default() -> Self {
        Self::new()
    }
}
