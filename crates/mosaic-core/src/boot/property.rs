use super::{BasicValue, BootValue, Selectable};
use crate::mapping::{FetchStyle, FetchTiming};
use crate::Type;

#[derive(Debug, Clone)]
pub struct Property {
    pub name: String,
    pub value: BootValue,
    pub insertable: bool,
    pub updatable: bool,
    pub optimistic_lock: bool,
    pub optional: bool,
    pub natural_id: bool,
    pub fetch_timing: FetchTiming,
    pub fetch_style: FetchStyle,
}

impl Property {
    pub fn new(name: impl Into<String>, value: impl Into<BootValue>) -> Property {
        let value = value.into();

        // Collections are loaded on access unless asked otherwise.
        let (fetch_timing, fetch_style) = match &value {
            BootValue::Collection(_) => (FetchTiming::Delayed, FetchStyle::Select),
            _ => (FetchTiming::Immediate, FetchStyle::Join),
        };

        Property {
            name: name.into(),
            value,
            insertable: true,
            updatable: true,
            optimistic_lock: true,
            optional: true,
            natural_id: false,
            fetch_timing,
            fetch_style,
        }
    }

    pub fn basic(name: impl Into<String>, ty: Type, selectable: impl Into<Selectable>) -> Property {
        Property::new(name, BasicValue::new(ty, selectable))
    }

    pub fn natural_id(mut self) -> Property {
        self.natural_id = true;
        self.updatable = false;
        self
    }

    pub fn lazy(mut self) -> Property {
        self.fetch_timing = FetchTiming::Delayed;
        self
    }

    pub fn eager(mut self) -> Property {
        self.fetch_timing = FetchTiming::Immediate;
        self
    }

    pub fn fetch(mut self, style: FetchStyle) -> Property {
        self.fetch_style = style;
        self
    }

    pub fn read_only(mut self) -> Property {
        self.insertable = false;
        self.updatable = false;
        self
    }

    pub fn not_optional(mut self) -> Property {
        self.optional = false;
        self
    }

    pub fn excluded_from_optimistic_lock(mut self) -> Property {
        self.optimistic_lock = false;
        self
    }
}
