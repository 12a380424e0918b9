/// Ordered, indexable collection of examples.
pub trait Dataset {
    type Example;

    fn examples_count(&self) -> usize;

    /// Panics if `index >= examples_count()`.
    fn example(&self, index: usize) -> &Self::Example;
}

impl<T> Dataset for [T] {
    type Example = T;

    fn examples_count(&self) -> usize {
        self.len()
    }

    fn example(&self, index: usize) -> &T {
        &self[index]
    }
}

impl<T> Dataset for Vec<T> {
    type Example = T;

    fn examples_count(&self) -> usize {
        self.len()
    }

    fn example(&self, index: usize) -> &T {
        &self[index]
    }
}

impl<D: Dataset + ?Sized> Dataset for &D {
    type Example = D::Example;

    fn examples_count(&self) -> usize {
        (**self).examples_count()
    }

    fn example(&self, index: usize) -> &D::Example {
        (**self).example(index)
    }
}
