// Crypto Tax Engine
// Written in 2025 by
//   The cryptotax Developers
//
// To the extent possible under law, the author(s) have dedicated all
// copyright and related and neighboring rights to this software to
// the public domain worldwide. This software is distributed without
// any warranty.
//
// You should have received a copy of the CC0 Public Domain Dedication
// along with this software.
// If not, see <http://creativecommons.org/publicdomain/zero/1.0/>.
//

//! CSV
//!
//! Basic support for printing data in comma-separated-value format
//!

use crate::units::UtcTime;
use std::fmt;

/// Trait for objects that can be printed in CSV format
pub trait PrintCsv {
    fn print(&self, f: &mut fmt::Formatter) -> fmt::Result;
}

/// Wrapper around a `PrintCsv` used for println! etc
pub struct CsvPrinter<P: PrintCsv>(pub P);

impl<P: PrintCsv> fmt::Display for CsvPrinter<P> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.0.print(f)
    }
}

/// Wrapper around a date that will output only the date
#[derive(Copy, Clone)]
pub struct DateOnly(pub UtcTime);
impl PrintCsv for DateOnly {
    fn print(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0.format("%F"))
    }
}

/// Wrapper around a date that will output both date and time
#[derive(Copy, Clone)]
pub struct DateTime(pub UtcTime);
impl PrintCsv for DateTime {
    fn print(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0.format("%FT%T.%fZ"))
    }
}

impl PrintCsv for crate::units::Asset {
    fn print(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.as_str().print(f)
    }
}

impl PrintCsv for crate::transaction::TransactionType {
    fn print(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

macro_rules! impl_display {
    ($ty:ty) => {
        impl PrintCsv for $ty {
            fn print(&self, f: &mut fmt::Formatter) -> fmt::Result {
                fmt::Display::fmt(self, f)
            }
        }
    };
}

impl_display!(usize);
impl_display!(i32);
impl_display!(i64);
impl_display!(u32);
impl_display!(u64);
impl_display!(crate::units::Price);
impl_display!(crate::units::Amount);
impl_display!(rust_decimal::Decimal);

macro_rules! impl_string {
    ($ty:ty) => {
        impl PrintCsv for $ty {
            fn print(&self, f: &mut fmt::Formatter) -> fmt::Result {
                if self.contains(',') {
                    write!(f, "\"{}\"", self)
                } else {
                    write!(f, "{}", self)
                }
            }
        }
    };
}

impl_string!(String);
impl_string!(&str);
impl_string!(str);

macro_rules! impl_tuple {
    ($($ty:ident $idx:tt)*) => {
        impl<$($ty: PrintCsv,)*> PrintCsv for ($($ty,)*) {
            #[allow(unused_assignments)]
            fn print(&self, f: &mut fmt::Formatter) -> fmt::Result {
                let mut comma = false;
                $(
                    if comma {
                        f.write_str(",")?;
                    }
                    self.$idx.print(f)?;
                    comma = true;
                )*
                Ok(())
            }
        }
    }
}

impl_tuple!(A 0);
impl_tuple!(A 0 B 1);
impl_tuple!(A 0 B 1 C 2);
impl_tuple!(A 0 B 1 C 2 D 3);
impl_tuple!(A 0 B 1 C 2 D 3 E 4);
impl_tuple!(A 0 B 1 C 2 D 3 E 4 F 5);
impl_tuple!(A 0 B 1 C 2 D 3 E 4 F 5 G 6);
impl_tuple!(A 0 B 1 C 2 D 3 E 4 F 5 G 6 H 7);
impl_tuple!(A 0 B 1 C 2 D 3 E 4 F 5 G 6 H 7 I 8);
impl_tuple!(A 0 B 1 C 2 D 3 E 4 F 5 G 6 H 7 I 8 J 9);

impl<P: PrintCsv> PrintCsv for Option<P> {
    fn print(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Some(p) => p.print(f),
            None => Ok(()), // "write the empty string"
        }
    }
}

impl<'a, P: PrintCsv> PrintCsv for &'a P {
    fn print(&self, f: &mut fmt::Formatter) -> fmt::Result {
        (*self).print(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{amount, price};

    #[test]
    fn tuple_rows() {
        let row = CsvPrinter(("BTC", amount!(1.5), price!(100), Option::<u32>::None, 7u32));
        assert_eq!(row.to_string(), "BTC,1.5,100.00,,7");
    }

    #[test]
    fn strings_with_commas_are_quoted() {
        let row = CsvPrinter((String::from("a,b"), "plain"));
        assert_eq!(row.to_string(), "\"a,b\",plain");
    }

    #[test]
    fn date_wrappers() {
        let t = UtcTime::from_unix_i64(86_400).unwrap();
        assert_eq!(CsvPrinter(DateOnly(t)).to_string(), "1970-01-02");
        assert_eq!(
            CsvPrinter(DateTime(t)).to_string(),
            "1970-01-02T00:00:00.000000000Z",
        );
    }
}
