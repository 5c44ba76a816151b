use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

// Wire values are the original Manchester-style color names; they appear
// verbatim in the assistant's verdict payload and in stored rows.
str_enum!(RiskLevel {
    Vermelho => "vermelho",
    Laranja => "laranja",
    Amarelo => "amarelo",
    Verde => "verde",
    Indefinido => "indefinido",
});

impl RiskLevel {
    /// Canonical severity order for queue sorting, 0 = most severe.
    /// The only rank table in the crate; display code must not duplicate it.
    pub fn severity_rank(&self) -> u8 {
        match self {
            Self::Vermelho => 0,
            Self::Laranja => 1,
            Self::Amarelo => 2,
            Self::Verde => 3,
            Self::Indefinido => 4,
        }
    }

    /// Parse a wire/storage value, resolving anything unknown to `Indefinido`.
    ///
    /// A triage entry always carries one of the five levels; an absent or
    /// unrecognized verdict value must never become a missing field.
    pub fn parse_lenient(s: &str) -> Self {
        s.parse().unwrap_or(Self::Indefinido)
    }
}

str_enum!(QueueStatus {
    Aguardando => "aguardando",
    EmAtendimento => "em_atendimento",
    Finalizado => "finalizado",
});

impl QueueStatus {
    /// Queue entries move strictly forward, one step at a time:
    /// aguardando → em_atendimento → finalizado.
    pub fn can_advance_to(&self, next: QueueStatus) -> bool {
        matches!(
            (self, next),
            (Self::Aguardando, Self::EmAtendimento) | (Self::EmAtendimento, Self::Finalizado)
        )
    }
}

str_enum!(SpeakerRole {
    Patient => "patient",
    Assistant => "assistant",
});
