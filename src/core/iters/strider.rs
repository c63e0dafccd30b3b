use crate::core::shape::Shape;

// -- Strider ( logical row-major order -> buffer offsets )

pub(crate) struct Strider<'a> {
    shape: &'a Shape,
    indices: Vec<usize>,
    position: usize,
    current: usize,
    maximum: usize,
}

impl<'a> Strider<'a> {
    pub(crate) fn new(shape: &'a Shape) -> Self {
        Strider {
            shape,
            indices: vec![0; shape.rank()],
            position: shape.offset,
            current: 0,
            maximum: shape.numel(),
        }
    }
}

impl<'a> Iterator for Strider<'a> {
    type Item = usize;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current == self.maximum {
            return None;
        };

        let next = self.position;
        let shape = self.shape;
        let (sizes, strides) = (&shape.sizes, &shape.strides);

        for i in (0..sizes.len()).rev() {
            self.indices[i] += 1;

            if self.indices[i] >= sizes[i] {
                self.position -= (sizes[i] - 1) * strides[i];
                self.indices[i] = 0;
            } else {
                self.position += strides[i];
                break;
            }
        }

        self.current += 1;
        Some(next)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.maximum - self.current;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Strider<'_> {}

#[cfg(test)]
mod strider_tests {
    use super::*;

    #[test]
    fn contiguous_offsets() {
        let shape = Shape::new(&[2, 3]);
        assert_eq!(Strider::new(&shape).collect::<Vec<_>>(), vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn strided_offsets() {
        let shape = Shape::new(&[2, 3]).transpose(0, 1).unwrap();
        assert_eq!(Strider::new(&shape).collect::<Vec<_>>(), vec![0, 3, 1, 4, 2, 5]);

        let shape = Shape::new(&[3]).expand(&[2, 3]).unwrap();
        assert_eq!(Strider::new(&shape).collect::<Vec<_>>(), vec![0, 1, 2, 0, 1, 2]);
    }

    #[test]
    fn offset_and_scalar() {
        let shape = Shape::new(&[3, 2]).index(1).unwrap();
        assert_eq!(Strider::new(&shape).collect::<Vec<_>>(), vec![2, 3]);

        let scalar = Shape::new(&[]);
        assert_eq!(Strider::new(&scalar).collect::<Vec<_>>(), vec![0]);

        let empty = Shape::new(&[2, 0]);
        assert_eq!(Strider::new(&empty).count(), 0);
    }
}
