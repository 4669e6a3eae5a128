mod add_product;
mod browse_categories;
mod browse_products;
mod category;
mod create_category;
mod delete_category;
mod product;
mod update_category;
mod update_product;

pub use add_product::{AddProductPayload, add_product, add_product_endpoint};
pub use browse_categories::{
    CategoryProducts, CategoryProductsQuery, CategorySummary, CategoryWithProducts,
    ListCategoriesQuery, category_by_slug, category_products, category_products_endpoint,
    get_category_by_slug_endpoint, get_category_endpoint, list_categories,
    list_categories_endpoint,
};
pub use browse_products::{
    ListProductsQuery, RelatedProductsQuery, get_product_endpoint, list_products,
    list_products_endpoint, related_products, related_products_endpoint,
};
pub use category::{Category, active_products_in, products_in, slugify};
pub use create_category::{CreateCategoryPayload, create_category, create_category_endpoint};
pub use delete_category::{delete_category, delete_category_endpoint};
pub use product::{NewProduct, Product, ProductPatch};
pub use update_category::{UpdateCategoryPayload, update_category, update_category_endpoint};
pub use update_product::{
    delete_product, delete_product_endpoint, update_product, update_product_endpoint,
};
