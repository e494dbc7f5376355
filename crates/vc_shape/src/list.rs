use alloc::boxed::Box;
use alloc::vec::Vec;

use crate::{GenericShapeCell, Mapped, Shape, Typed};

/// Accessors of a growable collection.
pub struct ListInfo {
    item: fn() -> &'static Shape,
    new_empty: fn() -> Box<dyn Mapped>,
    len: fn(&dyn Mapped) -> usize,
    get: fn(&dyn Mapped, usize) -> Option<&dyn Mapped>,
    push: fn(&mut dyn Mapped, Box<dyn Mapped>) -> Result<(), Box<dyn Mapped>>,
    append: fn(&mut dyn Mapped, Box<dyn Mapped>) -> Result<(), Box<dyn Mapped>>,
}

fn vec_new<T: Typed>() -> Box<dyn Mapped> {
    Box::new(Vec::<T>::new())
}

fn vec_len<T: Typed>(list: &dyn Mapped) -> usize {
    list.downcast_ref::<Vec<T>>().map_or(0, Vec::len)
}

fn vec_get<T: Typed>(list: &dyn Mapped, index: usize) -> Option<&dyn Mapped> {
    Some(list.downcast_ref::<Vec<T>>()?.get(index)? as &dyn Mapped)
}

fn vec_push<T: Typed>(list: &mut dyn Mapped, item: Box<dyn Mapped>) -> Result<(), Box<dyn Mapped>> {
    let Some(list) = list.downcast_mut::<Vec<T>>() else {
        return Err(item);
    };
    list.push(item.take::<T>()?);
    Ok(())
}

fn vec_append<T: Typed>(list: &mut dyn Mapped, other: Box<dyn Mapped>) -> Result<(), Box<dyn Mapped>> {
    let Some(list) = list.downcast_mut::<Vec<T>>() else {
        return Err(other);
    };
    list.append(&mut other.take::<Vec<T>>()?);
    Ok(())
}

impl ListInfo {
    /// The accessors of `Vec<T>`.
    pub fn of_vec<T: Typed>() -> Self {
        Self {
            item: T::type_shape,
            new_empty: vec_new::<T>,
            len: vec_len::<T>,
            get: vec_get::<T>,
            push: vec_push::<T>,
            append: vec_append::<T>,
        }
    }

    /// The shape of the items.
    #[inline]
    pub fn item(&self) -> &'static Shape {
        (self.item)()
    }

    #[inline]
    pub fn new_empty(&self) -> Box<dyn Mapped> {
        (self.new_empty)()
    }

    #[inline]
    pub fn len(&self, list: &dyn Mapped) -> usize {
        (self.len)(list)
    }

    #[inline]
    pub fn get<'a>(&self, list: &'a dyn Mapped, index: usize) -> Option<&'a dyn Mapped> {
        (self.get)(list, index)
    }

    /// Iterates over the items of `list`.
    pub fn items<'a>(&'a self, list: &'a dyn Mapped) -> impl Iterator<Item = &'a dyn Mapped> + 'a {
        (0..self.len(list)).filter_map(move |index| self.get(list, index))
    }

    /// Appends one item. Gives the item back on a type mismatch.
    #[inline]
    pub fn push(&self, list: &mut dyn Mapped, item: Box<dyn Mapped>) -> Result<(), Box<dyn Mapped>> {
        (self.push)(list, item)
    }

    /// Moves every item of `other` to the end of `list`.
    #[inline]
    pub fn append(&self, list: &mut dyn Mapped, other: Box<dyn Mapped>) -> Result<(), Box<dyn Mapped>> {
        (self.append)(list, other)
    }
}

impl<T: Typed> Typed for Vec<T> {
    fn type_shape() -> &'static Shape {
        static CELL: GenericShapeCell = GenericShapeCell::new();
        CELL.get_or_insert::<Self>(|| {
            Shape::list::<Self>(ListInfo::of_vec::<T>()).with_default_value::<Self>()
        })
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::String;
    use alloc::vec;

    use super::*;

    #[test]
    fn push_and_append() {
        let info = <Vec<String>>::type_shape().as_list().unwrap();
        let mut list = info.new_empty();

        info.push(&mut *list, Box::new(String::from("a"))).unwrap();
        info.append(&mut *list, Box::new(vec![String::from("b"), String::from("c")])).unwrap();
        assert!(info.push(&mut *list, Box::new(1_u8)).is_err());

        assert_eq!(info.len(&*list), 3);
        let items: Vec<&str> = info
            .items(&*list)
            .filter_map(|item| item.downcast_ref::<String>())
            .map(String::as_str)
            .collect();
        assert_eq!(items, ["a", "b", "c"]);
    }

    #[test]
    fn item_shape() {
        let info = <Vec<u64>>::type_shape().as_list().unwrap();
        assert_eq!(info.item().name(), "u64");
    }
}
