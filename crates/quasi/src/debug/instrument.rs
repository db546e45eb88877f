//! Debugger instrumentation

use std::convert::Infallible;
use std::sync::Arc;

use log::debug;

use crate::bound::{Bound, BoundKind};

/// Wrap every node in a [`BoundKind::Debug`] marker and every lambda body in
/// a [`BoundKind::LambdaBody`] marker.
///
/// Markers carry the offset of the node they wrap. Subtrees that already are
/// markers are left alone, so instrumenting twice changes nothing. The input
/// tree is not modified; the result shares no nodes with it except such
/// already-marked subtrees.
pub fn instrument(program: &Arc<Bound>) -> Arc<Bound> {
    debug!("instrumenting program at offset {}", program.offset);
    wrap(program)
}

fn wrap(node: &Arc<Bound>) -> Arc<Bound> {
    if node.is_marker() {
        return Arc::clone(node);
    }

    let rebuilt = node.try_map_children::<Infallible>(&mut |child: &Arc<Bound>| {
        let wrapped = wrap(child);
        Ok((!Arc::ptr_eq(&wrapped, child)).then_some(wrapped))
    });
    let mut inner = match rebuilt {
        Ok(Some(rebuilt)) => rebuilt,
        Ok(None) => Bound::clone(node),
        Err(never) => match never {},
    };

    if let BoundKind::Lambda { body, .. } = &mut inner.kind {
        if !matches!(body.kind, BoundKind::LambdaBody(_)) {
            *body = Arc::new(Bound::new(body.offset, BoundKind::LambdaBody(Arc::clone(body))));
        }
    }

    Arc::new(Bound::new(
        inner.offset,
        BoundKind::Debug(Arc::new(inner)),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binder::{bind, NoImports};
    use crate::syntax::Builder;
    use crate::SymbolTable;

    fn count_markers(node: &Bound) -> (usize, usize) {
        let mut counts = match node.kind {
            BoundKind::Debug(_) => (1, 0),
            BoundKind::LambdaBody(_) => (0, 1),
            _ => (0, 0),
        };
        let _ = node.try_map_children::<Infallible>(&mut |child: &Arc<Bound>| {
            let (d, l) = count_markers(child);
            counts.0 += d;
            counts.1 += l;
            Ok(None)
        });
        counts
    }

    #[test]
    fn test_every_node_wrapped_once() {
        let symbols = SymbolTable::new();
        let b = Builder::new();
        // (\x -> x)(1): call, lambda, reference, literal
        let program = b.call(b.lambda(&["x"], b.reference("x")), vec![b.int(1)]);
        let bound = bind(&program, &symbols, &NoImports).unwrap();

        let instrumented = instrument(&bound);
        assert_eq!(count_markers(&instrumented), (4, 1));
        assert_eq!(instrumented.offset, bound.offset);
    }

    #[test]
    fn test_instrument_is_idempotent() {
        let symbols = SymbolTable::new();
        let b = Builder::new();
        let program = b.let_in(vec![("f", b.lambda(&[], b.int(2)))], b.reference("f"));
        let bound = bind(&program, &symbols, &NoImports).unwrap();

        let once = instrument(&bound);
        let twice = instrument(&once);
        assert!(Arc::ptr_eq(&once, &twice));
        assert_eq!(count_markers(&twice), count_markers(&once));
    }

    #[test]
    fn test_original_tree_untouched() {
        let symbols = SymbolTable::new();
        let b = Builder::new();
        let bound = bind(&b.array(vec![b.int(1).into()]), &symbols, &NoImports).unwrap();
        let before = Bound::clone(&bound);

        let _ = instrument(&bound);
        assert_eq!(*bound, before);
        assert_eq!(count_markers(&bound), (0, 0));
    }
}
