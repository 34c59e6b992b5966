use serde::{Deserialize, Serialize};

/// Fuel grades sold at the pumps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FuelType {
    Diesel,
    Gasohol95,
    Gasohol91,
    E20,
    Benzine,
}

impl FuelType {
    pub fn code(&self) -> &'static str {
        match self {
            FuelType::Diesel => "diesel",
            FuelType::Gasohol95 => "gasohol95",
            FuelType::Gasohol91 => "gasohol91",
            FuelType::E20 => "e20",
            FuelType::Benzine => "benzine",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            FuelType::Diesel => "Diesel",
            FuelType::Gasohol95 => "Gasohol 95",
            FuelType::Gasohol91 => "Gasohol 91",
            FuelType::E20 => "E20",
            FuelType::Benzine => "Benzine",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "diesel" => Some(FuelType::Diesel),
            "gasohol95" => Some(FuelType::Gasohol95),
            "gasohol91" => Some(FuelType::Gasohol91),
            "e20" => Some(FuelType::E20),
            "benzine" => Some(FuelType::Benzine),
            _ => None,
        }
    }
}

impl std::fmt::Display for FuelType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}
