//! String pools and localized string slots.

use byteorder::{ByteOrder, LittleEndian};
use derive_more::derive::{AsRef, Deref};
use std::ffi::CStr;

use crate::error::{OutOfBoundsError, Result};

/// Number of locale slots in a localized string.
pub const TOTAL_LOCALES: usize = 9;

/// Size in bytes of a localized string slot inside a materialized row.
pub const LOCALIZED_STRING_SIZE: usize = TOTAL_LOCALES * 4;

/// Slot value for a locale that has not been resolved.
pub const UNRESOLVED: u32 = u32::MAX;

/// Client locales, in slot order
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u32)]
#[allow(non_camel_case_types)]
pub enum Locale {
    #[default]
    enUS = 0,
    koKR = 1,
    frFR = 2,
    deDE = 3,
    zhCN = 4,
    zhTW = 5,
    esES = 6,
    esMX = 7,
    ruRU = 8,
}

impl Locale {
    /// Every locale in slot order.
    pub const ALL: [Locale; TOTAL_LOCALES] = [
        Locale::enUS,
        Locale::koKR,
        Locale::frFR,
        Locale::deDE,
        Locale::zhCN,
        Locale::zhTW,
        Locale::esES,
        Locale::esMX,
        Locale::ruRU,
    ];

    /// Slot this locale occupies inside a localized string.
    pub const fn slot(self) -> usize {
        self as usize
    }
}

impl TryFrom<u32> for Locale {
    type Error = OutOfBoundsError;

    fn try_from(value: u32) -> core::result::Result<Self, Self::Error> {
        Locale::ALL
            .get(value as usize)
            .copied()
            .ok_or(OutOfBoundsError::Locale(value))
    }
}

impl std::str::FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> core::result::Result<Self, Self::Err> {
        Locale::ALL
            .into_iter()
            .find(|l| format!("{l:?}").eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown locale {s}"))
    }
}

/// Read the null terminated string starting at `offset` in `pool`.
pub(crate) fn read_cstr(pool: &[u8], offset: u32) -> Result<&CStr> {
    let start = offset as usize;
    let tail = pool.get(start..).filter(|t| !t.is_empty()).ok_or(
        OutOfBoundsError::StringOffset {
            offset,
            size: pool.len(),
        },
    )?;

    CStr::from_bytes_until_nul(tail)
        .map_err(|_| OutOfBoundsError::UnterminatedString { offset }.into())
}

/// Owned copy of a file's string pool, resolved for one locale
///
/// Offsets stored in a [`LocalizedString`] slot for [`StringPool::locale`] index into this
/// pool.
#[derive(Debug, Clone, PartialEq, Eq, Deref, AsRef)]
pub struct StringPool {
    #[deref]
    #[as_ref]
    data: Vec<u8>,
    locale: Locale,
}

impl StringPool {
    pub(crate) fn new(data: Vec<u8>, locale: Locale) -> Self {
        StringPool { data, locale }
    }

    /// Locale whose slots refer to this pool.
    pub fn locale(&self) -> Locale {
        self.locale
    }

    /// Null terminated string at `offset`.
    pub fn get(&self, offset: u32) -> Result<&CStr> {
        read_cstr(&self.data, offset)
    }

    /// UTF-8 string at `offset`.
    pub fn get_str(&self, offset: u32) -> Result<&str> {
        Ok(self.get(offset)?.to_str()?)
    }
}

/// Read only view of a localized string slot inside a materialized row
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct LocalizedString<'a> {
    slots: &'a [u8],
}

impl<'a> LocalizedString<'a> {
    pub(crate) fn new(slots: &'a [u8]) -> Self {
        debug_assert_eq!(slots.len(), LOCALIZED_STRING_SIZE);
        LocalizedString { slots }
    }

    /// Pool offset stored for `locale`, if it has been resolved.
    pub fn offset(&self, locale: Locale) -> Option<u32> {
        let start = locale.slot() * 4;
        let value = LittleEndian::read_u32(&self.slots[start..start + 4]);
        (value != UNRESOLVED).then_some(value)
    }

    /// Resolve the string through `pool` using the pool's locale slot.
    pub fn get(&self, pool: &'a StringPool) -> Result<Option<&'a str>> {
        self.offset(pool.locale())
            .map(|offset| pool.get_str(offset))
            .transpose()
    }
}
