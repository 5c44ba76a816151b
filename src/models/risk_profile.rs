//! Static display metadata per risk level.
//!
//! The dashboard and the patient result screen style entries by risk level;
//! both read this table. Ordering logic lives in `RiskLevel::severity_rank`,
//! not here.

use serde::Serialize;

use super::enums::RiskLevel;

#[derive(Debug, Clone, Serialize)]
pub struct RiskProfile {
    pub level: RiskLevel,
    pub name: &'static str,
    pub color_class: &'static str,
    pub bg_color_class: &'static str,
}

/// Look up the display profile for a risk level. Total over the enum.
pub fn risk_profile(level: RiskLevel) -> &'static RiskProfile {
    match level {
        RiskLevel::Vermelho => &RiskProfile {
            level: RiskLevel::Vermelho,
            name: "Risco Imediato",
            color_class: "text-red-800",
            bg_color_class: "bg-red-100",
        },
        RiskLevel::Laranja => &RiskProfile {
            level: RiskLevel::Laranja,
            name: "Risco médio alto",
            color_class: "text-orange-800",
            bg_color_class: "bg-orange-100",
        },
        RiskLevel::Amarelo => &RiskProfile {
            level: RiskLevel::Amarelo,
            name: "Risco moderado",
            color_class: "text-yellow-800",
            bg_color_class: "bg-yellow-100",
        },
        RiskLevel::Verde => &RiskProfile {
            level: RiskLevel::Verde,
            name: "Baixo risco",
            color_class: "text-green-800",
            bg_color_class: "bg-green-100",
        },
        RiskLevel::Indefinido => &RiskProfile {
            level: RiskLevel::Indefinido,
            name: "Indefinido",
            color_class: "text-gray-800",
            bg_color_class: "bg-gray-100",
        },
    }
}
